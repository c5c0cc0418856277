//! Overlay (aside) state: which side panel is showing
//!
//! A page has several mutually exclusive panels: cart, search, mobile menu,
//! submenu and the product quick-add form. At most one is open at a time.
//! The state is a tiny reducer over [`OverlayAction`]s; the
//! [`OverlayCoordinator`] wraps it with the four UI-facing operations and is
//! owned by the page session rather than living in a global.

use serde::{Deserialize, Serialize};

/// The panel currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayKind {
    #[default]
    Closed,
    Search,
    Cart,
    #[serde(rename = "mobile")]
    MobileMenu,
    Submenu,
    #[serde(rename = "product-form")]
    ProductQuickForm,
}

impl OverlayKind {
    pub fn is_open(self) -> bool {
        self != OverlayKind::Closed
    }
}

/// Product staged for the quick-add form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Variant staged for the quick-add form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRef {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Snapshot read by UI components
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayState {
    pub active: OverlayKind,
    pub selected_product: Option<ProductRef>,
    pub selected_variant: Option<VariantRef>,
}

/// Every way the overlay state can change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OverlayAction {
    Open(OverlayKind),
    Close,
    SelectProduct(Option<ProductRef>),
    SelectVariant(Option<VariantRef>),
}

impl OverlayState {
    /// Pure transition function
    ///
    /// `Open` replaces the active panel unconditionally and leaves the
    /// selection alone. `Close` returns to `Closed` and clears the selection.
    pub fn reduce(self, action: OverlayAction) -> OverlayState {
        match action {
            OverlayAction::Open(kind) => OverlayState {
                active: kind,
                ..self
            },
            OverlayAction::Close => OverlayState::default(),
            OverlayAction::SelectProduct(product) => OverlayState {
                selected_product: product,
                ..self
            },
            OverlayAction::SelectVariant(variant) => OverlayState {
                selected_variant: variant,
                ..self
            },
        }
    }
}

/// Owner of one page session's [`OverlayState`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayCoordinator {
    state: OverlayState,
}

impl OverlayCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn active(&self) -> OverlayKind {
        self.state.active
    }

    pub(crate) fn dispatch(&mut self, action: OverlayAction) -> &OverlayState {
        let from = self.state.active;
        self.state = std::mem::take(&mut self.state).reduce(action);
        if from != self.state.active {
            tracing::debug!(from = ?from, to = ?self.state.active, "overlay transition");
        }
        &self.state
    }

    pub fn open(&mut self, kind: OverlayKind) -> &OverlayState {
        self.dispatch(OverlayAction::Open(kind))
    }

    pub fn close(&mut self) -> &OverlayState {
        self.dispatch(OverlayAction::Close)
    }

    pub fn set_selected_product(&mut self, product: Option<ProductRef>) -> &OverlayState {
        self.dispatch(OverlayAction::SelectProduct(product))
    }

    pub fn set_selected_variant(&mut self, variant: Option<VariantRef>) -> &OverlayState {
        self.dispatch(OverlayAction::SelectVariant(variant))
    }

    /// Keyboard hook: Escape closes whichever panel is open
    ///
    /// Returns `true` when the key caused a transition.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if key == "Escape" && self.state.active.is_open() {
            self.close();
            return true;
        }
        false
    }

    /// Back to the initial state, as on a full page load
    pub fn reset(&mut self) {
        self.dispatch(OverlayAction::Close);
    }
}
