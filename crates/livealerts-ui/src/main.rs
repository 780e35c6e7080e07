mod api;
mod app;
mod components;
mod dropdown;

use std::rc::Rc;

use livealerts_core::BoardConfig;

const BOARD_CONFIG: &str =
  include_str!("../assets/board.toml");

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting live alerts board"
  );

  let config = Rc::new(
    BoardConfig::load_or_default(
      BOARD_CONFIG
    )
  );

  let Some(mount) = web_sys::window()
    .and_then(|window| {
      window.document()
    })
    .and_then(|document| {
      document.get_element_by_id("events")
    })
  else {
    tracing::error!(
      "missing #events mount element"
    );
    return;
  };

  yew::Renderer::<app::App>::with_root_and_props(
    mount,
    app::AppProps { config }
  )
  .render();
}
