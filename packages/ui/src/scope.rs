use dioxus::prelude::*;
use notes::ViewScope;

/// A [`ViewScope`] that lives as long as the calling component.
///
/// The scope is cancelled when the component unmounts, so results of work
/// started through it are dropped instead of landing in a dead view.
pub fn use_view_scope() -> ViewScope {
    let scope = use_hook(ViewScope::new);
    use_drop({
        let scope = scope.clone();
        move || scope.cancel()
    });
    scope
}
