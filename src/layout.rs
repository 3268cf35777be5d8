pub const NAV_COLLAPSE_BELOW: f64 = 992.0;
pub const SCROLL_TABLES_BELOW: f64 = 768.0;
pub const COMPACT_BELOW: f64 = 576.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassChange {
    Add(&'static str),
    Remove(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRule {
    pub selector: &'static str,
    pub changes: Vec<ClassChange>,
}

impl ClassRule {
    fn new(selector: &'static str, changes: Vec<ClassChange>) -> Self {
        Self { selector, changes }
    }
}

/// What the page should look like at a given viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPlan {
    pub collapse_nav: bool,
    pub compact: bool,
    pub scrollable_tables: bool,
}

impl LayoutPlan {
    pub fn for_width(width: f64) -> Self {
        Self {
            collapse_nav: width < NAV_COLLAPSE_BELOW,
            compact: width < COMPACT_BELOW,
            scrollable_tables: width < SCROLL_TABLES_BELOW,
        }
    }

    /// Class edits to apply, by selector. Nav collapse and table scrolling
    /// are one-way; only the compact rules are reversed on wide screens.
    pub fn class_rules(&self) -> Vec<ClassRule> {
        use ClassChange::{Add, Remove};

        let mut rules = Vec::with_capacity(4);
        if self.collapse_nav {
            rules.push(ClassRule::new(".navbar-collapse", vec![Remove("show")]));
        }
        if self.compact {
            rules.push(ClassRule::new(".card", vec![Add("px-2")]));
            rules.push(ClassRule::new(".btn-action", vec![Add("w-100"), Remove("me-2")]));
        } else {
            rules.push(ClassRule::new(".card", vec![Remove("px-2")]));
            rules.push(ClassRule::new(".btn-action", vec![Remove("w-100"), Add("me-2")]));
        }
        if self.scrollable_tables {
            rules.push(ClassRule::new(".table-responsive", vec![Add("overflow-auto")]));
        }
        rules
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterToggle {
    pub display: &'static str,
    pub scroll_into_view: bool,
}

/// Next state of the filter panel. Only an explicit `none` counts as hidden.
pub fn toggle_filter_section(current_display: &str, width: f64) -> FilterToggle {
    let revealing = current_display == "none";
    FilterToggle {
        display: if revealing { "block" } else { "none" },
        scroll_into_view: revealing && width < SCROLL_TABLES_BELOW,
    }
}
