#![forbid(unsafe_code)]

//! Navigation flow controller.
//!
//! One finite state machine owns which screen is visible and what phase of
//! its transition it is in. Every movement is triggered by a timer, a user
//! action, or the resolution of a hosted-service call, and each timer is
//! armed under a stable id so navigation away (or teardown) cancels it
//! before it can fire against a screen that no longer exists.
//!
//! The flow table, from app start:
//!
//! | Screen         | Leaves when                           | Next             |
//! |----------------|---------------------------------------|------------------|
//! | Splash         | 2000ms hold, then 500ms fade          | LanguageSelect   |
//! | LanguageSelect | pick + 300ms debounce + 500ms exit    | Register         |
//! | Register       | registration + profile write succeed  | Login            |
//! | Login          | sign-in + role lookup succeed         | Buyer/SellerHome |
//! | *Home          | explicit back                         | Login            |
//!
//! A transition may not begin while another is mid-flight; the guard covers
//! both exit animations and in-flight service calls.

use crate::catalog_view::CatalogView;
use crate::forms::{LoginForm, RegisterForm};
use crate::gate::{AuthGate, GateView};
use freshlink_core::{
    AuthError, AuthService, Error, Field, FieldError, FlowError, IdentityId, ProfileError,
    ProfileStore, Role, UserProfile,
};
use freshlink_i18n::{Locale, LocaleContext};
use freshlink_runtime::{Cmd, Model, SessionFeed, SubId, Subscription, TimerId};
use std::sync::Arc;
use web_time::Duration;

/// Splash hold before the fade begins.
pub const SPLASH_HOLD_DELAY: Duration = Duration::from_millis(2000);
/// Enter/exit animation length shared by all screens.
pub const FADE_DELAY: Duration = Duration::from_millis(500);
/// Pause after a language pick before it commits.
pub const LOCALE_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

pub const SPLASH_HOLD: TimerId = TimerId(1);
pub const SPLASH_FADE: TimerId = TimerId(2);
pub const LOCALE_DEBOUNCE: TimerId = TimerId(3);
pub const SCREEN_EXIT: TimerId = TimerId(4);
pub const ENTER_SETTLE: TimerId = TimerId(5);

/// Stable id for the session feed on protected screens.
pub const SESSION_FEED_ID: SubId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    LanguageSelect,
    Register,
    Login,
    BuyerHome,
    SellerHome,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Splash => "splash",
            Self::LanguageSelect => "language-select",
            Self::Register => "register",
            Self::Login => "login",
            Self::BuyerHome => "buyer-home",
            Self::SellerHome => "seller-home",
        }
    }

    /// Screens behind the auth gate.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::BuyerHome | Self::SellerHome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Entering,
    Steady,
    Exiting,
}

/// Which screen is active and where its transition stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub screen: Screen,
    pub phase: TransitionPhase,
}

/// Everything that can happen to the flow.
#[derive(Debug)]
pub enum FlowMsg {
    SplashHoldElapsed,
    SplashFadeElapsed,
    EnterSettled,
    ScreenExitElapsed,
    LocalePicked(Locale),
    LocaleCommitted,
    GoToLogin,
    GoToRegister,
    RoleChanged(Role),
    RegisterInput(Field, String),
    LoginInput(Field, String),
    RegisterSubmitted,
    LoginSubmitted,
    RegistrationResolved(Result<IdentityId, AuthError>),
    ProfileSaved(Result<(), ProfileError>),
    SignInResolved(Result<IdentityId, AuthError>),
    RoleResolved(Result<Option<UserProfile>, ProfileError>),
    SessionChanged(Option<IdentityId>),
    Back,
}

/// A transition in progress. While one of these is set, no new transition
/// may begin.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Flight {
    SplashOut,
    LocaleCommit(Locale),
    LeavingTo(Screen),
    Registering(Box<UserProfile>),
    SavingProfile,
    SigningIn,
    ResolvingRole(IdentityId),
}

enum NavKind {
    /// Record the current screen so back can return to it.
    Push,
    /// Overwrite the current entry; back skips the screen being left.
    Replace,
    /// Navigation that came from popping history.
    Pop,
}

/// The flow controller model.
pub struct FlowModel {
    nav: NavigationState,
    history: Vec<Screen>,
    locale: LocaleContext,
    login_form: LoginForm,
    register_form: RegisterForm,
    field_errors: Vec<FieldError>,
    banner: Option<&'static str>,
    catalog: CatalogView,
    gate: AuthGate,
    in_flight: Option<Flight>,
    auth: Arc<dyn AuthService>,
    profiles: Arc<dyn ProfileStore>,
}

impl FlowModel {
    pub fn new(
        auth: Arc<dyn AuthService>,
        profiles: Arc<dyn ProfileStore>,
        locale: LocaleContext,
    ) -> Self {
        Self::with_screen(auth, profiles, locale, Screen::Splash)
    }

    /// Start on an arbitrary screen — the direct-load path. Landing on a
    /// protected screen goes through the gate like any other mount.
    pub fn with_screen(
        auth: Arc<dyn AuthService>,
        profiles: Arc<dyn ProfileStore>,
        locale: LocaleContext,
        screen: Screen,
    ) -> Self {
        Self {
            nav: NavigationState {
                screen,
                phase: TransitionPhase::Entering,
            },
            history: Vec::new(),
            locale,
            login_form: LoginForm::new(),
            register_form: RegisterForm::new(),
            field_errors: Vec::new(),
            banner: None,
            catalog: CatalogView::demo(),
            gate: AuthGate::new(),
            in_flight: None,
            auth,
            profiles,
        }
    }

    pub fn navigation(&self) -> NavigationState {
        self.nav
    }

    pub fn screen(&self) -> Screen {
        self.nav.screen
    }

    pub fn phase(&self) -> TransitionPhase {
        self.nav.phase
    }

    /// The i18n key of the current banner message, if any.
    pub fn banner(&self) -> Option<&'static str> {
        self.banner
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn locale(&self) -> Locale {
        self.locale.get()
    }

    pub fn login_form(&self) -> &LoginForm {
        &self.login_form
    }

    pub fn register_form(&self) -> &RegisterForm {
        &self.register_form
    }

    /// Buyer-screen view-state. Meaningful while on [`Screen::BuyerHome`];
    /// reset when that screen unmounts.
    pub fn catalog(&self) -> &CatalogView {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut CatalogView {
        &mut self.catalog
    }

    pub fn gate_view(&self) -> GateView {
        self.gate.view()
    }

    fn can_transition(&self) -> bool {
        self.nav.phase != TransitionPhase::Exiting && self.in_flight.is_none()
    }

    /// Switch screens: run the leave hooks for the old screen, cancel its
    /// stale timers, and mount the destination in its entering phase.
    fn mount(&mut self, to: Screen, kind: NavKind) -> Cmd<FlowMsg> {
        let from = self.nav.screen;
        if from == Screen::BuyerHome && to != Screen::BuyerHome {
            self.catalog.reset();
        }
        if from.is_protected() != to.is_protected() {
            self.gate.reset();
        }
        if matches!(kind, NavKind::Push) {
            self.history.push(from);
        }
        self.nav = NavigationState {
            screen: to,
            phase: TransitionPhase::Entering,
        };
        self.banner = None;
        self.field_errors.clear();
        tracing::debug!(
            target: "freshlink.flow",
            from = from.as_str(),
            to = to.as_str(),
            "navigate"
        );
        Cmd::batch(vec![
            Cmd::cancel_timer(SPLASH_HOLD),
            Cmd::cancel_timer(SPLASH_FADE),
            Cmd::cancel_timer(LOCALE_DEBOUNCE),
            Cmd::cancel_timer(SCREEN_EXIT),
            Cmd::timer(ENTER_SETTLE, FADE_DELAY, FlowMsg::EnterSettled),
        ])
    }

    fn surface_error(&mut self, err: Error) -> Cmd<FlowMsg> {
        tracing::warn!(
            target: "freshlink.flow",
            error = %err,
            error_type = err.error_type(),
            recovery = ?err.recovery(),
            "surfacing error"
        );
        self.banner = Some(err.message_key());
        Cmd::none()
    }
}

impl Model for FlowModel {
    type Message = FlowMsg;

    fn init(&mut self) -> Cmd<FlowMsg> {
        tracing::debug!(
            target: "freshlink.flow",
            screen = self.nav.screen.as_str(),
            "flow mounted"
        );
        let mut cmds = vec![Cmd::timer(ENTER_SETTLE, FADE_DELAY, FlowMsg::EnterSettled)];
        if self.nav.screen == Screen::Splash {
            cmds.push(Cmd::timer(
                SPLASH_HOLD,
                SPLASH_HOLD_DELAY,
                FlowMsg::SplashHoldElapsed,
            ));
        }
        Cmd::batch(cmds)
    }

    fn update(&mut self, msg: FlowMsg) -> Cmd<FlowMsg> {
        match msg {
            FlowMsg::EnterSettled => {
                if self.nav.phase == TransitionPhase::Entering {
                    self.nav.phase = TransitionPhase::Steady;
                }
                Cmd::none()
            }

            // ── Splash ──────────────────────────────────────────────
            FlowMsg::SplashHoldElapsed => {
                if self.nav.screen != Screen::Splash || !self.can_transition() {
                    return Cmd::none();
                }
                self.nav.phase = TransitionPhase::Exiting;
                self.in_flight = Some(Flight::SplashOut);
                Cmd::timer(SPLASH_FADE, FADE_DELAY, FlowMsg::SplashFadeElapsed)
            }
            FlowMsg::SplashFadeElapsed => {
                if self.in_flight != Some(Flight::SplashOut) {
                    return Cmd::none();
                }
                self.in_flight = None;
                self.mount(Screen::LanguageSelect, NavKind::Replace)
            }

            // ── Language selection ──────────────────────────────────
            FlowMsg::LocalePicked(locale) => {
                if self.nav.screen != Screen::LanguageSelect || !self.can_transition() {
                    return Cmd::none();
                }
                self.in_flight = Some(Flight::LocaleCommit(locale));
                Cmd::timer(LOCALE_DEBOUNCE, LOCALE_DEBOUNCE_DELAY, FlowMsg::LocaleCommitted)
            }
            FlowMsg::LocaleCommitted => {
                let Some(Flight::LocaleCommit(locale)) = &self.in_flight else {
                    return Cmd::none();
                };
                let locale = *locale;
                self.locale.set(locale);
                self.nav.phase = TransitionPhase::Exiting;
                self.in_flight = Some(Flight::LeavingTo(Screen::Register));
                Cmd::timer(SCREEN_EXIT, FADE_DELAY, FlowMsg::ScreenExitElapsed)
            }
            FlowMsg::ScreenExitElapsed => {
                let Some(Flight::LeavingTo(to)) = &self.in_flight else {
                    return Cmd::none();
                };
                let to = *to;
                self.in_flight = None;
                self.mount(to, NavKind::Replace)
            }

            // ── Register ⇄ Login navigation ─────────────────────────
            FlowMsg::GoToLogin => {
                if self.nav.screen != Screen::Register || !self.can_transition() {
                    return Cmd::none();
                }
                self.mount(Screen::Login, NavKind::Push)
            }
            FlowMsg::GoToRegister => {
                if self.nav.screen != Screen::Login || !self.can_transition() {
                    return Cmd::none();
                }
                self.mount(Screen::Register, NavKind::Push)
            }

            // ── Form input ──────────────────────────────────────────
            FlowMsg::RoleChanged(role) => {
                self.register_form.role = role;
                self.field_errors.clear();
                Cmd::none()
            }
            FlowMsg::RegisterInput(field, value) => {
                self.register_form.set(field, value);
                self.field_errors.retain(|e| e.field != field);
                Cmd::none()
            }
            FlowMsg::LoginInput(field, value) => {
                self.login_form.set(field, value);
                self.field_errors.retain(|e| e.field != field);
                Cmd::none()
            }

            // ── Registration ────────────────────────────────────────
            FlowMsg::RegisterSubmitted => {
                if self.nav.screen != Screen::Register || !self.can_transition() {
                    return Cmd::none();
                }
                self.banner = None;
                match self.register_form.validate() {
                    Err(errors) => {
                        tracing::debug!(
                            target: "freshlink.flow",
                            fields = errors.len(),
                            "registration blocked by validation"
                        );
                        self.field_errors = errors;
                        Cmd::none()
                    }
                    Ok(registration) => {
                        self.field_errors.clear();
                        self.in_flight =
                            Some(Flight::Registering(Box::new(registration.profile)));
                        let auth = Arc::clone(&self.auth);
                        let (email, password) = (registration.email, registration.password);
                        Cmd::task("auth.register", move || {
                            FlowMsg::RegistrationResolved(
                                auth.register_identity(&email, &password),
                            )
                        })
                    }
                }
            }
            FlowMsg::RegistrationResolved(result) => {
                let Some(Flight::Registering(profile)) = self.in_flight.take() else {
                    return Cmd::none();
                };
                match result {
                    Ok(identity) => {
                        self.in_flight = Some(Flight::SavingProfile);
                        let profiles = Arc::clone(&self.profiles);
                        Cmd::task("profile.put", move || {
                            FlowMsg::ProfileSaved(profiles.put_profile(&identity, *profile))
                        })
                    }
                    Err(err) => self.surface_error(err.into()),
                }
            }
            FlowMsg::ProfileSaved(result) => {
                if self.in_flight != Some(Flight::SavingProfile) {
                    return Cmd::none();
                }
                self.in_flight = None;
                match result {
                    Ok(()) => {
                        let cmd = self.mount(Screen::Login, NavKind::Push);
                        self.banner = Some("registerSuccess");
                        cmd
                    }
                    Err(err) => self.surface_error(err.into()),
                }
            }

            // ── Login ───────────────────────────────────────────────
            FlowMsg::LoginSubmitted => {
                if self.nav.screen != Screen::Login || !self.can_transition() {
                    return Cmd::none();
                }
                self.banner = None;
                match self.login_form.validate() {
                    Err(errors) => {
                        self.field_errors = errors;
                        Cmd::none()
                    }
                    Ok(()) => {
                        self.field_errors.clear();
                        self.in_flight = Some(Flight::SigningIn);
                        let auth = Arc::clone(&self.auth);
                        let (email, password) = (
                            self.login_form.email.trim().to_string(),
                            self.login_form.password.clone(),
                        );
                        Cmd::task("auth.signIn", move || {
                            FlowMsg::SignInResolved(auth.sign_in(&email, &password))
                        })
                    }
                }
            }
            FlowMsg::SignInResolved(result) => {
                if self.in_flight != Some(Flight::SigningIn) {
                    return Cmd::none();
                }
                self.in_flight = None;
                match result {
                    Ok(identity) => {
                        // Exactly one profile lookup per successful sign-in.
                        self.in_flight = Some(Flight::ResolvingRole(identity.clone()));
                        let profiles = Arc::clone(&self.profiles);
                        Cmd::task("profile.get", move || {
                            FlowMsg::RoleResolved(profiles.profile(&identity))
                        })
                    }
                    Err(err) => self.surface_error(err.into()),
                }
            }
            FlowMsg::RoleResolved(result) => {
                let Some(Flight::ResolvingRole(identity)) = self.in_flight.take() else {
                    return Cmd::none();
                };
                match result {
                    Ok(Some(profile)) => {
                        tracing::info!(
                            target: "freshlink.flow",
                            identity = %identity,
                            role = %profile.role,
                            "routing after sign-in"
                        );
                        match profile.role {
                            Role::Buyer => self.mount(Screen::BuyerHome, NavKind::Push),
                            Role::Seller => self.mount(Screen::SellerHome, NavKind::Push),
                        }
                    }
                    Ok(None) => self.surface_error(
                        FlowError::RoleUnresolved {
                            identity: identity.to_string(),
                        }
                        .into(),
                    ),
                    Err(err) => self.surface_error(err.into()),
                }
            }

            // ── Protected screens ───────────────────────────────────
            FlowMsg::SessionChanged(identity) => {
                if !self.nav.screen.is_protected() {
                    return Cmd::none();
                }
                self.gate.observe(identity);
                if self.gate.view() == GateView::RedirectToRegister {
                    tracing::info!(
                        target: "freshlink.flow",
                        screen = self.nav.screen.as_str(),
                        "unauthenticated; redirecting to register"
                    );
                    return self.mount(Screen::Register, NavKind::Replace);
                }
                Cmd::none()
            }
            FlowMsg::Back => {
                if !self.nav.screen.is_protected() || !self.can_transition() {
                    return Cmd::none();
                }
                let target = self.history.pop().unwrap_or(Screen::Login);
                self.mount(target, NavKind::Pop)
            }
        }
    }

    fn subscriptions(&self) -> Vec<Box<dyn Subscription<FlowMsg>>> {
        if self.nav.screen.is_protected() {
            vec![Box::new(SessionFeed::new(
                SESSION_FEED_ID,
                Arc::clone(&self.auth),
                FlowMsg::SessionChanged,
            ))]
        } else {
            Vec::new()
        }
    }
}
