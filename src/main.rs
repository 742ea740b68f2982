#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use openstack_dashboard::app::DashboardApp;
use openstack_dashboard::config::Config;
use tr::{tr, tr_init};
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tr_init!("./locales");

    let config = Config::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(tr!("OpenStack Cloud Dashboard"))
            .with_inner_size([1100.0, 720.0])
            .with_resizable(true),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "openstack_dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)?))),
    )
}
