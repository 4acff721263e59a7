use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ToastProps {
    pub message: Option<AttrValue>,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let Some(message) = props.message.clone() else {
        return html! {};
    };
    html! {
        <div style="position:fixed; left:50%; bottom:28px; transform:translateX(-50%); background:rgba(22,27,34,0.95); border:1px solid #30363d; border-radius:8px; padding:10px 18px; font-size:14px; box-shadow:0 4px 12px rgba(0,0,0,0.5); z-index:50; pointer-events:none;">
            { message }
        </div>
    }
}
