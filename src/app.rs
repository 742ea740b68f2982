use crate::config::Config;
use crate::logic::{ApiClient, ApiError, Command, CommandSender, SharedState, lock_state, worker_task};
use crate::model::pricing::CURRENCY_SYMBOL;
use crate::model::{
    AppState, DashboardState, PricingInfo, ResourceCard, ResourceSnapshot, Route, Section, Session,
    StatusTone, format_price, format_rate,
};
use eframe::egui;
use eframe::egui::{Color32, RichText};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tr::tr;
use tracing::{debug, error, info, warn};

const CARD_WIDTH: f32 = 260.0;
const FORM_WIDTH: f32 = 260.0;

pub struct DashboardApp {
    pub(crate) state: SharedState,
    pub(crate) commands: CommandSender,
    pub input_username: String,
    pub input_password: String,
    pub(crate) show_password: bool,
    /// Whether the poller was asked to run for the dashboard on screen.
    pub(crate) polling: bool,
    /// Token value last written to app storage.
    persisted_token: String,
}

/// Something the user asked for on the dashboard, applied after drawing.
enum DashboardAction {
    Refresh,
    Logout,
    Select(Section),
}

/// Helper for application-specific colors adapted for light/dark themes.
struct DashboardVisuals {
    pub is_dark: bool,
}

impl DashboardVisuals {
    fn from_ctx(ctx: &egui::Context) -> Self {
        Self {
            is_dark: ctx.style().visuals.dark_mode,
        }
    }

    fn tone_color(&self, tone: StatusTone) -> Color32 {
        match tone {
            StatusTone::Active => {
                if self.is_dark {
                    Color32::from_rgb(52, 211, 153)
                } else {
                    Color32::from_rgb(5, 150, 105)
                }
            }
            StatusTone::Warning => {
                if self.is_dark {
                    Color32::from_rgb(251, 191, 36)
                } else {
                    Color32::from_rgb(217, 119, 6)
                }
            }
            StatusTone::Neutral => {
                if self.is_dark {
                    Color32::from_gray(170)
                } else {
                    Color32::from_gray(90)
                }
            }
        }
    }

    fn error_color(&self) -> Color32 {
        if self.is_dark {
            Color32::from_rgb(248, 113, 113)
        } else {
            Color32::from_rgb(220, 38, 38)
        }
    }

    fn accent(&self) -> Color32 {
        Color32::from_rgb(59, 130, 246)
    }

    fn overview_fill(&self) -> Color32 {
        if self.is_dark {
            Color32::from_rgb(30, 58, 138)
        } else {
            Color32::from_rgb(219, 234, 254)
        }
    }
}

impl DashboardApp {
    /// Restores the session from app storage and starts the network worker
    /// on its own tokio runtime.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Result<Self, ApiError> {
        let session = restore_session(cc.storage);
        info!(
            authenticated = session.is_authenticated(),
            api_url = %config.api_url,
            "starting dashboard"
        );

        let state = Arc::new(Mutex::new(AppState::with_session(session)));
        let api = ApiClient::new(&config)?;
        let (commands, receiver) = mpsc::unbounded_channel();

        let worker_state = state.clone();
        let poll_interval = config.poll_interval;
        std::thread::spawn(move || {
            match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => {
                    runtime.block_on(worker_task(api, worker_state, receiver, poll_interval))
                }
                Err(err) => error!(%err, "failed to start the network runtime"),
            }
        });

        Ok(Self::from_state(state, commands))
    }

    pub fn from_state(state: SharedState, commands: CommandSender) -> Self {
        let persisted_token = lock_state(&state).session.to_stored();
        Self {
            state,
            commands,
            input_username: String::new(),
            input_password: String::new(),
            show_password: false,
            polling: false,
            persisted_token,
        }
    }

    /// Writes the token to `storage` as soon as it differs from what was
    /// last written, so a login or logout survives an abrupt exit.
    pub fn persist_session(&mut self, storage: &mut dyn eframe::Storage) {
        let token = lock_state(&self.state).session.to_stored();
        if token == self.persisted_token {
            return;
        }
        debug!(stored = !token.is_empty(), "writing session to storage");
        storage.set_string(Session::STORAGE_KEY, token.clone());
        storage.flush();
        self.persisted_token = token;
    }

    pub fn ui_layout(&mut self, ctx: &egui::Context) {
        let route = lock_state(&self.state).gate();
        self.sync_polling(route);

        match route {
            Route::Login => self.login_ui(ctx),
            Route::Dashboard => self.dashboard_ui(ctx),
        }
    }

    fn send(&self, command: Command) {
        if let Err(err) = self.commands.send(command) {
            warn!(command = ?err.0, "network worker is not running");
        }
    }

    /// Mounts or unmounts the dashboard: fresh view state and a running
    /// poller while it is shown, no poller otherwise.
    fn sync_polling(&mut self, route: Route) {
        match (route, self.polling) {
            (Route::Dashboard, false) => {
                lock_state(&self.state).dashboard = DashboardState::default();
                self.input_password.clear();
                self.send(Command::StartPolling);
                self.polling = true;
            }
            (Route::Login, true) => {
                self.send(Command::StopPolling);
                self.polling = false;
            }
            _ => {}
        }
    }

    fn submit_credentials(&mut self) {
        let username = self.input_username.trim().to_string();
        {
            let mut state = lock_state(&self.state);
            state.login.pending = true;
            state.login.error = None;
        }
        self.send(Command::Login {
            username,
            password: self.input_password.clone(),
        });
    }

    fn login_ui(&mut self, ctx: &egui::Context) {
        let visuals = DashboardVisuals::from_ctx(ctx);
        let (pending, login_error) = {
            let state = lock_state(&self.state);
            (state.login.pending, state.login.error.clone())
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label(RichText::new(tr!("OpenStack Cloud")).size(28.0).strong());
                ui.label(tr!("Welcome back! Please login to your account."));
                ui.add_space(16.0);

                let user_field_id = ui.make_persistent_id("username_field");
                let password_field_id = ui.make_persistent_id("password_field");

                let user_rs = ui.add(
                    egui::TextEdit::singleline(&mut self.input_username)
                        .id(user_field_id)
                        .hint_text(tr!("Username"))
                        .desired_width(FORM_WIDTH),
                );
                ui.add_space(4.0);
                let password_rs = ui.add(
                    egui::TextEdit::singleline(&mut self.input_password)
                        .id(password_field_id)
                        .password(!self.show_password)
                        .hint_text(tr!("Password"))
                        .desired_width(FORM_WIDTH),
                );
                ui.checkbox(&mut self.show_password, tr!("Show password"));

                // Enter in the user name field moves on to the password
                if user_rs.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    ui.memory_mut(|mem| mem.request_focus(password_field_id));
                }

                if let Some(message) = &login_error {
                    ui.add_space(4.0);
                    ui.colored_label(visuals.error_color(), message);
                }

                ui.add_space(8.0);
                let clicked = ui
                    .add_enabled(
                        !pending,
                        egui::Button::new(tr!("Sign In")).min_size(egui::vec2(FORM_WIDTH, 32.0)),
                    )
                    .clicked();
                let entered =
                    password_rs.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                if pending {
                    ui.label(tr!("Signing in..."));
                }

                // Both fields are required, same as the HTML form this replaces
                if (clicked || entered)
                    && !pending
                    && !self.input_username.trim().is_empty()
                    && !self.input_password.is_empty()
                {
                    self.submit_credentials();
                }
            });
        });
    }

    fn dashboard_ui(&mut self, ctx: &egui::Context) {
        let visuals = DashboardVisuals::from_ctx(ctx);
        // Draw from a copy so the worker is never blocked on the UI
        let dashboard = lock_state(&self.state).dashboard.clone();
        let mut action = None;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(tr!("OpenStack Cloud Dashboard"))
                        .size(20.0)
                        .strong(),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(tr!("Logout")).clicked() {
                        action = Some(DashboardAction::Logout);
                    }

                    let mut theme = ui.ctx().options(|o| o.theme_preference);
                    let old_theme = theme;
                    theme.radio_buttons(ui);
                    if theme != old_theme {
                        ui.ctx().options_mut(|o| o.theme_preference = theme);
                    }

                    if ui
                        .add_enabled(!dashboard.refreshing, egui::Button::new(tr!("Refresh")))
                        .clicked()
                    {
                        action = Some(DashboardAction::Refresh);
                    }

                    if let Some(updated) = dashboard.last_updated {
                        ui.weak(tr!("Updated {}", updated.format("%H:%M:%S").to_string()));
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if dashboard.loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(80.0);
                    ui.label(RichText::new(tr!("Loading your cloud resources...")).size(18.0));
                });
                return;
            }

            if let Some(message) = &dashboard.error {
                ui.colored_label(visuals.error_color(), RichText::new(message).strong());
                ui.add_space(4.0);
            }

            cost_overview(ui, &visuals, &dashboard.snapshot.pricing_info);
            ui.add_space(8.0);

            let mut selected = dashboard.active_section;
            ui.horizontal_wrapped(|ui| {
                for section in Section::ALL {
                    ui.selectable_value(&mut selected, section, section.label());
                }
            });
            if selected != dashboard.active_section {
                action = Some(DashboardAction::Select(selected));
            }
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match dashboard.active_section {
                    Section::Pricing => pricing_section(ui, &visuals, &dashboard.snapshot),
                    section => resource_cards(ui, &visuals, &dashboard.snapshot, section),
                });
        });

        match action {
            Some(DashboardAction::Refresh) => self.send(Command::Refresh),
            Some(DashboardAction::Logout) => {
                info!("logging out");
                lock_state(&self.state).logout();
                self.sync_polling(Route::Login);
            }
            Some(DashboardAction::Select(section)) => {
                lock_state(&self.state).dashboard.select_section(section);
            }
            None => {}
        }
    }
}

fn cost_overview(ui: &mut egui::Ui, visuals: &DashboardVisuals, pricing: &PricingInfo) {
    egui::Frame::group(ui.style())
        .fill(visuals.overview_fill())
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(tr!("Total Infrastructure Cost"));
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format_price(pricing.total_cost))
                                .size(28.0)
                                .strong(),
                        );
                        ui.weak(pricing.currency_code());
                    });
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    for (flavor, rate) in pricing.visible_rates() {
                        ui.label(
                            RichText::new(tr!("{}: {}/hr", flavor, format_rate(rate))).monospace(),
                        );
                    }
                });
            });
        });
}

fn resource_cards(
    ui: &mut egui::Ui,
    visuals: &DashboardVisuals,
    snapshot: &ResourceSnapshot,
    section: Section,
) {
    let cards = snapshot.cards(section);
    if cards.is_empty() {
        ui.weak(tr!("No {} found", section.label().to_lowercase()));
        return;
    }

    ui.horizontal_wrapped(|ui| {
        for card in &cards {
            ui.push_id(card.key(), |ui| resource_card(ui, visuals, card));
        }
    });
}

fn resource_card(ui: &mut egui::Ui, visuals: &DashboardVisuals, card: &ResourceCard<'_>) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(CARD_WIDTH);
        ui.vertical(|ui| {
            ui.label(RichText::new(card.title()).size(16.0).strong());
            if let Some(badge) = card.badge() {
                ui.colored_label(
                    visuals.tone_color(badge.tone),
                    RichText::new(badge.label).small().strong(),
                );
            }

            let metrics = card.metrics();
            if !metrics.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    for metric in metrics {
                        ui.label(RichText::new(metric).monospace());
                    }
                });
            }

            for detail in card.details() {
                ui.weak(detail);
            }
        });
    });
}

fn pricing_section(ui: &mut egui::Ui, visuals: &DashboardVisuals, snapshot: &ResourceSnapshot) {
    ui.label(
        RichText::new(tr!("Infrastructure Cost Calculation"))
            .size(20.0)
            .strong(),
    );
    ui.label(tr!(
        "Your infrastructure cost is calculated based on the following factors:"
    ));
    ui.add_space(8.0);

    ui.columns(2, |columns| {
        columns[0].strong(tr!("Instance Pricing (Per Hour)"));
        let rates: Vec<(&str, f64)> = snapshot.pricing_info.visible_rates().collect();
        TableBuilder::new(&mut columns[0])
            .striped(true)
            .vscroll(false)
            .column(Column::remainder())
            .column(Column::auto())
            .body(|mut body| {
                for (flavor, rate) in rates {
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            ui.label(flavor);
                        });
                        row.col(|ui| {
                            ui.label(tr!("{}{}/hour", CURRENCY_SYMBOL, format_rate(rate)));
                        });
                    });
                }
            });

        let notes = &mut columns[1];
        notes.strong(tr!("How Costs Are Calculated"));
        notes.label(tr!("• Instance costs are based on the flavor type and uptime"));
        notes.label(tr!("• Uptime is calculated from instance creation time"));
        notes.label(tr!("• Total cost = (Uptime in hours) × (Hourly rate)"));
        notes.label(tr!("• Costs are updated in real-time every 30 seconds"));
    });

    if snapshot.instances.is_empty() {
        return;
    }

    ui.add_space(12.0);
    ui.strong(tr!("Cost per instance"));
    let chart = BarChart::new(
        tr!("Cost"),
        snapshot
            .instances
            .iter()
            .enumerate()
            .map(|(i, instance)| {
                Bar::new(i as f64, instance.pricing.total_cost)
                    .name(&instance.name)
                    .width(0.6)
                    .fill(visuals.accent())
            })
            .collect(),
    );
    Plot::new("instance_costs")
        .height(180.0)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .include_y(0.0)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Session found in app storage from the previous run, if any.
pub fn restore_session(storage: Option<&dyn eframe::Storage>) -> Session {
    Session::from_stored(storage.and_then(|storage| storage.get_string(Session::STORAGE_KEY)))
}

impl eframe::App for DashboardApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let token = lock_state(&self.state).session.to_stored();
        storage.set_string(Session::STORAGE_KEY, token.clone());
        self.persisted_token = token;
    }

    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.ui_layout(ctx);
        if let Some(storage) = frame.storage_mut() {
            self.persist_session(storage);
        }
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
