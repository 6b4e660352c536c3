use anyhow::Result;
use eframe::emath::Align2;
use eframe::{egui, Frame};
use egui::{Context, WidgetText};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use lobby_common::{Notification, Severity};
use lobby_store::RemoteStore;
use lobby_workflow::{DirectoryState, FriendDirectory, ProfileEditor};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let rt = Runtime::new()?;
    let _enter = rt.enter();

    let base_url = std::env::var("LOBBY_STORE_URL")
        .unwrap_or_else(|_| String::from("http://localhost:8000"));
    let store = Arc::new(RemoteStore::new(base_url));

    // Session is acquired once at startup; both workflows share it.
    let session = rt.block_on(store.current_user())?;
    let (directory, dir_state, dir_notes) = FriendDirectory::new(session.clone(), store.clone());
    let (profile, hotel_name, profile_notes) = ProfileEditor::new(session, store);
    rt.block_on(async {
        directory.load_known_friends().await;
        profile.load().await;
    });

    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(420.0, 480.0)),
        ..Default::default()
    };
    eframe::run_native(
        "Lobby",
        options,
        Box::new(|_cc| {
            Box::new(LobbyApp::new(
                rt,
                directory,
                dir_state,
                dir_notes,
                profile,
                hotel_name,
                profile_notes,
            ))
        }),
    )
    .unwrap();
    Ok(())
}

struct LobbyApp {
    runtime: Runtime,
    directory: FriendDirectory,
    dir_state: watch::Receiver<DirectoryState>,
    dir_notes: mpsc::UnboundedReceiver<Notification>,
    profile: ProfileEditor,
    profile_notes: mpsc::UnboundedReceiver<Notification>,
    search_entry: String,
    name_entry: String,
    toasts: Toasts,
}

impl LobbyApp {
    #[allow(clippy::too_many_arguments)]
    fn new(
        runtime: Runtime,
        directory: FriendDirectory,
        dir_state: watch::Receiver<DirectoryState>,
        dir_notes: mpsc::UnboundedReceiver<Notification>,
        profile: ProfileEditor,
        hotel_name: watch::Receiver<String>,
        profile_notes: mpsc::UnboundedReceiver<Notification>,
    ) -> Self {
        let name_entry = hotel_name.borrow().clone();
        Self {
            runtime,
            directory,
            dir_state,
            dir_notes,
            profile,
            profile_notes,
            search_entry: String::new(),
            name_entry,
            toasts: Toasts::new()
                .anchor(Align2::LEFT_TOP, (10.0, 10.0))
                .direction(egui::Direction::TopDown),
        }
    }

    fn drain_notifications(&mut self) {
        let mut pending = Vec::new();
        while let Ok(note) = self.dir_notes.try_recv() {
            pending.push(note);
        }
        while let Ok(note) = self.profile_notes.try_recv() {
            pending.push(note);
        }
        for note in pending {
            let kind = match note.severity {
                Severity::Success => ToastKind::Success,
                Severity::Warning => ToastKind::Warning,
                Severity::Error => ToastKind::Error,
            };
            self.toasts.add(Toast {
                kind,
                text: WidgetText::from(note.message),
                options: ToastOptions::default()
                    .duration_in_seconds(3.0)
                    .show_progress(true)
                    .show_icon(true),
            });
        }
    }
}

impl eframe::App for LobbyApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        self.drain_notifications();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Find friends");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.search_entry);
                if ui.button("search").clicked() {
                    self.runtime
                        .block_on(self.directory.search(&self.search_entry));
                }
            });

            let candidates = self.dir_state.borrow().candidates.clone();
            for candidate in candidates {
                ui.horizontal(|ui| {
                    ui.label(format!("{} ({})", candidate.name, candidate.email));
                    if ui.button("request").clicked() {
                        self.runtime.block_on(self.directory.send_request(&candidate));
                    }
                });
            }

            ui.separator();
            ui.collapsing("my hotel", |ui| {
                ui.text_edit_singleline(&mut self.name_entry);
                if ui.button("save").clicked() {
                    self.runtime.block_on(self.profile.save(&self.name_entry));
                }
            });
        });
        self.toasts.show(ctx);
    }
}
