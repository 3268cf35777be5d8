fn main() {
    #[cfg(target_arch = "wasm32")]
    paisatrack_frontend::start();
}
