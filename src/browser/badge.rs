use web_sys::Element;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UserBadgeProps {
    pub username: AttrValue,
}

#[function_component(UserBadge)]
pub fn user_badge(props: &UserBadgeProps) -> Html {
    html! {
        <>
            <i class="bi bi-person-circle"></i>
            { " " }
            { props.username.clone() }
        </>
    }
}

/// Replaces the navbar dropdown label with the signed-in user's name.
pub fn mount(root: Element, username: &str) {
    root.set_inner_html("");
    let props = UserBadgeProps {
        username: AttrValue::from(username.to_string()),
    };
    yew::Renderer::<UserBadge>::with_root_and_props(root, props).render();
}
