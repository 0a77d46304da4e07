use yew::prelude::*;

use crate::model::Theme;

#[derive(Properties, PartialEq, Clone)]
pub struct ThemeToggleProps {
    pub theme: Theme,
    pub on_toggle: Callback<()>,
}

#[function_component(ThemeToggle)]
pub fn theme_toggle(props: &ThemeToggleProps) -> Html {
    let onclick = {
        let cb = props.on_toggle.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let title = if props.theme.is_dark() {
        "Switch to light theme"
    } else {
        "Switch to dark theme"
    };
    html! {
        <button class="theme-toggle" {title} {onclick}>{ props.theme.toggle_glyph() }</button>
    }
}
