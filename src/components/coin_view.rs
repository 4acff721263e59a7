use yew::prelude::*;

use crate::state::flipper::Spin;

#[derive(Properties, PartialEq, Clone)]
pub struct CoinViewProps {
    pub image: AttrValue,
    pub alt: AttrValue,
    pub upright: bool,
    pub spin: Option<Spin>,
    /// Inspection transform of the wrapper (zoom, pan, rotate).
    pub transform: AttrValue,
}

#[function_component(CoinView)]
pub fn coin_view(props: &CoinViewProps) -> Html {
    let mirror = if props.upright { 1 } else { -1 };
    // A new key per flip restarts the spin animation.
    let (key, spin_style) = match props.spin {
        Some(spin) => (
            format!("spin-{}", spin.flip_id),
            format!(
                "animation:cd-spin {}ms linear; --cd-turns:{}deg;",
                spin.duration_ms,
                spin.half_turns * 180
            ),
        ),
        None => ("rest".to_string(), String::new()),
    };
    html! {
        <div style={format!("transform:{}; transform-origin:center;", props.transform)}>
            <div key={key} style={spin_style}>
                <img
                    src={props.image.clone()}
                    alt={props.alt.clone()}
                    draggable="false"
                    style={format!("display:block; width:min(70vw, 320px); height:auto; border-radius:50%; transform:scaleX({mirror}); pointer-events:none;")}
                />
            </div>
        </div>
    }
}
