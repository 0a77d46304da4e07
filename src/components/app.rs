use super::{family_canvas::FamilyCanvas, theme_toggle::ThemeToggle};
use crate::model::Theme;
use crate::util::set_body_class;
use yew::prelude::*;

#[function_component(App)]
pub fn app() -> Html {
    let theme = use_state(Theme::default);

    // Effect: mirror theme onto the body class (page chrome reads `--fg` from it)
    {
        let current = *theme;
        use_effect_with(current, move |_| {
            set_body_class("dark", current.is_dark());
            || ()
        });
    }

    let toggle = {
        let theme = theme.clone();
        Callback::from(move |_| {
            let next = theme.toggled();
            log::info!("theme -> {:?}", next);
            theme.set(next);
        })
    };

    html! {
        <>
            <ThemeToggle theme={*theme} on_toggle={toggle} />
            <FamilyCanvas theme={*theme} />
            <footer>{ "© Potato, 2025. CC BY-NC 4.0" }</footer>
        </>
    }
}
