use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::info;
use yew::prelude::*;

use super::{
    flipper_screen::FlipperScreen, landing::LandingScreen, toast::Toast,
    wallet_screen::WalletScreen,
};
use crate::catalog::CoinCatalog;
use crate::config::AppConfig;
use crate::model::{Coin, CoinSide};
use crate::state::tutorial::TutorialSignal;
use crate::state::{LocalStore, TutorialTracker, WalletStore};

const STYLES: &str = r#"
body { margin:0; background:#0d1117; color:#c9d1d9; font-family:system-ui, sans-serif; overscroll-behavior:none; }
button { background:#21262d; color:#c9d1d9; border:1px solid #30363d; border-radius:6px; padding:6px 12px; font-size:14px; }
@keyframes cd-spin { from { transform: rotateY(0deg); } to { transform: rotateY(var(--cd-turns)); } }
"#;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlipperRoute {
    /// Coin reopened from the wallet; the featured coin when `None`.
    pub coin_id: Option<String>,
    pub open_info: bool,
    pub from_wallet: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Landing,
    Flipper(FlipperRoute),
    Wallet { teach: bool },
}

#[derive(Default, PartialEq)]
struct Revision(u64);

impl Reducible for Revision {
    type Action = ();

    fn reduce(self: Rc<Self>, _: ()) -> Rc<Self> {
        Rc::new(Revision(self.0.wrapping_add(1)))
    }
}

/// Services shared by every screen. Mutations go through the methods here
/// so that screens re-render after the wallet or the tutorial changed.
#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<AppConfig>,
    pub catalog: Rc<CoinCatalog>,
    pub wallet: Rc<RefCell<WalletStore>>,
    pub tutorial: Rc<RefCell<TutorialTracker>>,
    pub revision: u64,
    router: Callback<Route>,
    refresh: Callback<()>,
    notify: Callback<String>,
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        self.revision == other.revision
            && Rc::ptr_eq(&self.config, &other.config)
            && Rc::ptr_eq(&self.wallet, &other.wallet)
            && Rc::ptr_eq(&self.tutorial, &other.tutorial)
    }
}

impl AppContext {
    pub fn navigate(&self, route: Route) {
        self.router.emit(route);
    }

    pub fn signal(&self, signal: TutorialSignal) {
        self.signal_all(&[signal]);
    }

    pub fn signal_all(&self, signals: &[TutorialSignal]) {
        let changed = {
            let mut tutorial = self.tutorial.borrow_mut();
            signals
                .iter()
                .fold(false, |changed, s| tutorial.signal(*s) | changed)
        };
        if changed {
            self.refresh.emit(());
        }
    }

    pub fn skip_step(&self) {
        if self.tutorial.borrow_mut().skip_step().is_some() {
            self.refresh.emit(());
        }
    }

    pub fn skip_tutorial(&self) {
        self.tutorial.borrow_mut().skip_all();
        self.refresh.emit(());
    }

    /// Adds a freshly flipped coin; the toast only shows for a new one.
    pub fn collect(&self, coin: &Coin, side: CoinSide) {
        if self.wallet.borrow_mut().add(&coin.id, side) {
            self.notify
                .emit(format!("{} added to your wallet", coin.display_title()));
            self.refresh.emit(());
        }
    }

    pub fn move_coin(&self, id: &str, x: f64, y: f64) -> bool {
        let moved = self.wallet.borrow_mut().update_position(id, x, y);
        if moved {
            self.refresh.emit(());
        }
        moved
    }
}

/// Panics when a screen is rendered outside [`App`].
#[hook]
pub fn use_app_context() -> AppContext {
    use_context::<AppContext>()
        .expect("AppContext missing: screens must be rendered inside <App>")
}

#[function_component(App)]
pub fn app() -> Html {
    let route = use_state(|| Route::Landing);
    let revision = use_reducer(Revision::default);
    let toast = use_state(|| None::<AttrValue>);
    let toast_timer = use_mut_ref(|| None::<Timeout>);

    let config = use_memo((), |_| AppConfig::load(&LocalStore));
    let catalog = use_memo((), |_| CoinCatalog::default());
    let wallet = use_memo((), |_| RefCell::new(WalletStore::load(Box::new(LocalStore))));
    let tutorial = use_memo((), |_| {
        RefCell::new(TutorialTracker::load(Box::new(LocalStore)))
    });

    let router = {
        let route = route.clone();
        Callback::from(move |next: Route| {
            info!("navigating to {next:?}");
            route.set(next);
        })
    };
    let refresh = {
        let revision = revision.dispatcher();
        Callback::from(move |_| revision.dispatch(()))
    };
    let notify = {
        let toast = toast.clone();
        let toast_timer = toast_timer.clone();
        let toast_ms = config.toast_ms;
        Callback::from(move |msg: String| {
            toast.set(Some(msg.into()));
            let toast = toast.clone();
            // Replacing the handle cancels the previous expiry.
            *toast_timer.borrow_mut() = Some(Timeout::new(toast_ms, move || toast.set(None)));
        })
    };

    let ctx = AppContext {
        config,
        catalog,
        wallet,
        tutorial,
        revision: revision.0,
        router,
        refresh,
        notify,
    };

    let content = match &*route {
        Route::Landing => html! { <LandingScreen /> },
        Route::Flipper(r) => {
            // Keyed so that reopening another coin mounts a fresh screen.
            let key = format!("{}-{}", r.coin_id.as_deref().unwrap_or("featured"), r.open_info);
            html! { <FlipperScreen key={key} route={r.clone()} /> }
        }
        Route::Wallet { teach } => html! { <WalletScreen teach={*teach} /> },
    };

    html! {
        <ContextProvider<AppContext> context={ctx}>
            <style>{ STYLES }</style>
            { content }
            <Toast message={(*toast).clone()} />
        </ContextProvider<AppContext>>
    }
}
