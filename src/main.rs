#[cfg(feature = "gui")]
use eframe::egui;

#[cfg(feature = "gui")]
use groovepan::{
    config, AccentCounts, AudioOutput, FileStore, GrooveGenerator, GrooveRequest, GridMode, Label,
    MemoryStore, MidiOutputDevice, PatternData, PatternStore, PlaybackEngine, PlaybackEvent,
    Preferences, Scale, Sequencer, SoundTrigger, Tier, SCALES,
};

#[cfg(feature = "gui")]
use clap::Parser;
#[cfg(feature = "gui")]
use rand::SeedableRng;
#[cfg(feature = "gui")]
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "gui")]
use std::path::PathBuf;

/// Handpan step sequencer
#[cfg(feature = "gui")]
#[derive(Parser, Debug)]
#[command(name = "groovepan", version)]
struct Args {
    /// Pattern store file (defaults to the user data directory)
    #[arg(long)]
    patterns: Option<PathBuf>,

    /// Preferences file (defaults to the user config directory)
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Seed for reproducible groove generation
    #[arg(long)]
    seed: Option<u64>,
}

#[cfg(feature = "gui")]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 820.0])
            .with_title("GroovePan - Handpan Sequencer"),
        ..Default::default()
    };

    let app = GrooveApp::new(args);
    eframe::run_native("GroovePan", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}

#[cfg(not(feature = "gui"))]
fn main() {
    eprintln!("This binary requires the 'gui' feature to be enabled");
    std::process::exit(1);
}

/// Groove dialog fields.
#[cfg(feature = "gui")]
#[derive(Default)]
struct GrooveForm {
    open: bool,
    /// Use the typed counts instead of a complexity tier
    manual: bool,
    counts: AccentCounts,
    tier: Tier,
    /// Dings on downbeats, Taks and Slaps on upbeats
    metrical: bool,
}

#[cfg(feature = "gui")]
struct GrooveApp {
    sequencer: Sequencer,
    audio_output: AudioOutput,
    midi_output: MidiOutputDevice,
    playback_engine: PlaybackEngine,
    generator: GrooveGenerator,
    rng: ChaCha8Rng,
    store: Box<dyn PatternStore>,
    prefs: Preferences,
    prefs_path: PathBuf,

    // UI state
    available_midi_ports: Vec<String>,
    selected_port: Option<usize>,
    current_visual_step: Option<usize>,
    groove: GrooveForm,
    pattern_names: Vec<String>,
    selected_pattern: String,
    name_input: String,
    json_text: String,
    status: Option<String>,
}

#[cfg(feature = "gui")]
impl GrooveApp {
    fn new(args: Args) -> Self {
        let prefs_path = args.prefs.unwrap_or_else(config::default_preferences_path);
        let prefs = Preferences::load_or_default(&prefs_path);

        let patterns_path = args.patterns.unwrap_or_else(config::default_patterns_path);
        let store: Box<dyn PatternStore> = match FileStore::open(&patterns_path) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("pattern store unavailable ({}), saving for this session only", e);
                Box::new(MemoryStore::new())
            }
        };

        let rng = match args.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        let mut sequencer = Sequencer::new(GridMode::Eighths);
        sequencer.set_metronome(prefs.metronome);
        sequencer.set_compose(prefs.compose);
        sequencer.set_hand_split(prefs.hand_split);

        let playback_engine = PlaybackEngine::new();
        playback_engine.set_metronome(prefs.metronome);

        let mut app = Self {
            sequencer,
            audio_output: AudioOutput::default(),
            midi_output: MidiOutputDevice::new(),
            playback_engine,
            generator: GrooveGenerator::new(),
            rng,
            store,
            prefs,
            prefs_path,
            available_midi_ports: MidiOutputDevice::available_ports(),
            selected_port: None,
            current_visual_step: None,
            groove: GrooveForm::default(),
            pattern_names: Vec::new(),
            selected_pattern: String::new(),
            name_input: String::new(),
            json_text: String::new(),
            status: None,
        };
        app.refresh_patterns(None);
        app
    }

    fn scale(&self) -> &'static Scale {
        Scale::by_name(&self.prefs.scale)
    }

    fn save_prefs(&mut self) {
        if let Err(e) = self.prefs.save(&self.prefs_path) {
            log::warn!("could not save preferences: {}", e);
        }
    }

    fn handle_playback_events(&mut self) {
        let scale = self.scale();
        let events = self.playback_engine.poll_events();

        for event in events {
            match event {
                PlaybackEvent::StepAdvanced(step) => {
                    self.current_visual_step = Some(step);
                    self.sequencer.set_current_position(step);
                }
                PlaybackEvent::Trigger { label, .. } => {
                    if self.prefs.handpan_sounds {
                        self.audio_output.play_label(label, scale);
                    }
                    self.midi_output.play_label(label, scale);
                }
                PlaybackEvent::Click(kind) => {
                    self.audio_output.click(kind);
                }
            }
        }
    }

    fn start_playback(&mut self) {
        self.playback_engine.set_metronome(self.sequencer.metronome());
        self.playback_engine.start(
            self.sequencer.step_duration(),
            self.sequencer.grid().mode().steps_per_beat(),
            self.sequencer.grid_state().clone(),
        );
    }

    fn stop_playback(&mut self) {
        self.playback_engine.stop();
        self.audio_output.stop_all();
        if let Err(e) = self.midi_output.release_all() {
            log::warn!("MIDI release failed: {}", e);
        }
        self.current_visual_step = None;
        self.sequencer.set_current_position(0);
    }

    fn toggle_playback(&mut self) {
        if self.playback_engine.is_running() {
            self.stop_playback();
        } else {
            self.start_playback();
        }
    }

    fn restart_if_playing(&mut self) {
        if self.playback_engine.is_running() {
            self.current_visual_step = None;
            self.playback_engine.restart(
                self.sequencer.step_duration(),
                self.sequencer.grid().mode().steps_per_beat(),
                self.sequencer.grid_state().clone(),
            );
        }
    }

    fn set_metronome(&mut self, on: bool) {
        self.sequencer.set_metronome(on);
        self.playback_engine.set_metronome(on);
        self.prefs.metronome = on;
        self.save_prefs();
    }

    /// Play a label the way tapping the handpan would, writing it to the selection.
    fn strike(&mut self, label: Label, advance: bool) {
        let scale = self.scale();
        self.audio_output.play_label(label, scale);
        self.midi_output.play_label(label, scale);
        self.sequencer.write_to_selected(label, advance);
    }

    fn generate_groove(&mut self) {
        let slots = self.sequencer.grid().len();
        let request = if self.groove.manual {
            let AccentCounts { ding, tak, slap } = self.groove.counts;
            match GrooveRequest::manual(ding, tak, slap, slots) {
                Ok(request) => request,
                Err(e) => {
                    self.status = Some(e.to_string());
                    return;
                }
            }
        } else {
            self.groove.tier.roll(slots, &mut self.rng)
        };
        let request = if self.groove.metrical {
            request.with_pools(self.sequencer.metrical_pools())
        } else {
            request
        };

        let report = self
            .sequencer
            .generate_groove(&self.generator, &request, &mut self.rng);
        let counts = report.counts;
        self.status = Some(format!(
            "Groove: {} Ding, {} Tak, {} Slap{}",
            counts.ding,
            counts.tak,
            counts.slap,
            match report.shortfall() {
                0 => String::new(),
                n => format!(" ({n} did not fit)"),
            }
        ));
        self.groove.open = false;
    }

    fn refresh_patterns(&mut self, selected: Option<&str>) {
        match self.store.list() {
            Ok(names) => self.pattern_names = names,
            Err(e) => {
                self.status = Some(format!("Could not load patterns: {e}"));
                return;
            }
        }
        let last_used = self.store.last_used();
        let pick = selected
            .map(str::to_string)
            .filter(|n| self.pattern_names.contains(n))
            .or(last_used.filter(|n| self.pattern_names.contains(n)))
            .or_else(|| self.pattern_names.first().cloned());
        self.selected_pattern = pick.unwrap_or_default();
    }

    fn apply_pattern(&mut self, pattern: &PatternData) {
        let was_playing = self.playback_engine.is_running();
        if was_playing {
            self.stop_playback();
        }
        self.sequencer.apply_pattern(pattern);
        self.prefs.hand_split = pattern.hand_split;
        self.save_prefs();
        if was_playing {
            self.start_playback();
        }
    }

    fn save_pattern(&mut self) {
        let name = if self.name_input.trim().is_empty() {
            self.selected_pattern.clone()
        } else {
            self.name_input.trim().to_string()
        };
        let pattern = self.sequencer.to_pattern();
        match self.store.save(&name, &pattern) {
            Ok(()) => {
                self.status = Some(format!("Saved \"{name}\""));
                self.name_input.clear();
                self.refresh_patterns(Some(&name));
            }
            Err(e) => self.status = Some(format!("Save failed: {e}")),
        }
    }

    fn load_pattern(&mut self) {
        let name = self.selected_pattern.clone();
        if name.is_empty() {
            self.status = Some("No saved patterns yet. Click Save to store one.".into());
            return;
        }
        match self.store.load(&name) {
            Ok(Some(pattern)) => {
                self.apply_pattern(&pattern);
                if let Err(e) = self.store.mark_used(&name) {
                    log::warn!("could not remember last pattern: {}", e);
                }
                self.status = Some(format!("Loaded \"{name}\""));
            }
            Ok(None) => self.status = Some("Could not load that pattern.".into()),
            Err(e) => self.status = Some(format!("Load failed: {e}")),
        }
    }

    fn rename_pattern(&mut self) {
        let old = self.selected_pattern.clone();
        let new = self.name_input.trim().to_string();
        if old.is_empty() || new.is_empty() {
            self.status = Some("Select a pattern and type its new name first.".into());
            return;
        }
        match self.store.rename(&old, &new) {
            Ok(()) => {
                self.name_input.clear();
                self.refresh_patterns(Some(&new));
            }
            Err(e) => self.status = Some(format!("Rename failed: {e}")),
        }
    }

    fn delete_pattern(&mut self) {
        let name = self.selected_pattern.clone();
        if name.is_empty() {
            self.status = Some("Select a saved pattern first.".into());
            return;
        }
        match self.store.delete(&name) {
            Ok(()) => {
                self.status = Some(format!("Deleted \"{name}\""));
                self.refresh_patterns(None);
            }
            Err(e) => self.status = Some(format!("Delete failed: {e}")),
        }
    }

    fn export_pattern(&mut self) {
        match self.sequencer.to_pattern().to_json() {
            Ok(json) => self.json_text = json,
            Err(e) => self.status = Some(format!("Export failed: {e}")),
        }
    }

    fn import_pattern(&mut self) {
        match PatternData::from_json(&self.json_text) {
            Ok(pattern) => {
                self.apply_pattern(&pattern);
                self.status = Some("Imported pattern. Type a name and Save to keep it.".into());
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let (events, alt) = ctx.input(|i| (i.events.clone(), i.modifiers.alt));
        for event in events {
            match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => match key {
                    egui::Key::Escape => {
                        if self.groove.open {
                            self.groove.open = false;
                        } else if self.prefs.presentation {
                            self.prefs.presentation = false;
                            self.save_prefs();
                        } else {
                            self.sequencer.clear_selection();
                        }
                    }
                    egui::Key::Enter if self.groove.open => self.generate_groove(),
                    egui::Key::Enter => self.toggle_playback(),
                    egui::Key::Backspace | egui::Key::Delete => {
                        self.sequencer.write_to_selected(Label::Empty, !modifiers.alt);
                    }
                    egui::Key::ArrowRight => self.sequencer.advance_selection(1),
                    egui::Key::ArrowLeft => self.sequencer.advance_selection(-1),
                    _ => {}
                },
                egui::Event::Text(text) => {
                    for c in text.chars() {
                        if c.eq_ignore_ascii_case(&'m') {
                            let on = !self.sequencer.metronome();
                            self.set_metronome(on);
                        } else if let Some(label) = Label::from_key(c) {
                            self.sequencer.write_to_selected(label, !alt);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn transport_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let is_playing = self.playback_engine.is_running();
            if is_playing {
                if ui.button("⏸ Stop").clicked() {
                    self.stop_playback();
                }
            } else if ui.button("▶ Play").clicked() {
                self.start_playback();
            }

            ui.add_space(20.0);

            ui.label("BPM:");
            let mut bpm = self.sequencer.bpm();
            if ui
                .add(egui::Slider::new(&mut bpm, 40.0..=200.0).step_by(1.0))
                .changed()
            {
                self.sequencer.set_bpm(bpm);
                self.restart_if_playing();
            }

            ui.add_space(20.0);

            let mode = self.sequencer.grid().mode();
            if ui.button(mode.name()).clicked() {
                self.sequencer.set_mode(mode.toggled());
                self.restart_if_playing();
            }

            let metronome = self.sequencer.metronome();
            let text = if metronome { "Metronome: On" } else { "Metronome: Off" };
            if ui.selectable_label(metronome, text).clicked() {
                self.set_metronome(!metronome);
            }

            let compose = self.sequencer.compose();
            let text = if compose { "Compose: On" } else { "Compose: Off" };
            if ui.selectable_label(compose, text).clicked() {
                self.sequencer.set_compose(!compose);
                self.prefs.compose = !compose;
                self.save_prefs();
            }
        });

        ui.horizontal(|ui| {
            let split = self.sequencer.hand_split();
            let text = if split { "Left/Right: On" } else { "Left/Right: Off" };
            if ui.selectable_label(split, text).clicked() {
                self.sequencer.set_hand_split(!split);
                self.prefs.hand_split = !split;
                self.save_prefs();
            }

            if ui.checkbox(&mut self.prefs.handpan_sounds, "Handpan sounds").changed()
                | ui.checkbox(&mut self.prefs.dark_theme, "Dark").changed()
            {
                self.save_prefs();
            }

            let mut scale_changed = false;
            egui::ComboBox::from_label("Scale")
                .selected_text(self.prefs.scale.clone())
                .show_ui(ui, |ui| {
                    for scale in &SCALES {
                        if ui
                            .selectable_label(self.prefs.scale == scale.name, scale.name)
                            .clicked()
                        {
                            self.prefs.scale = scale.name.to_string();
                            scale_changed = true;
                        }
                    }
                });
            if scale_changed {
                self.save_prefs();
            }

            if ui.button("Present").clicked() {
                self.prefs.presentation = true;
                self.save_prefs();
            }
        });
    }

    fn grid_ui(&mut self, ui: &mut egui::Ui) {
        let grid = self.sequencer.grid().clone();
        let steps = grid.steps_per_measure();
        let selected = self.sequencer.selected();
        let is_playing = self.playback_engine.is_running();
        let hand_split = self.sequencer.hand_split();
        let mut clicked = None;

        egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
            for measure in 0..grid.measures() {
                ui.horizontal(|ui| {
                    for local in 0..steps {
                        let i = measure * steps + local;
                        ui.vertical(|ui| {
                            let mut caption = grid.step_caption(i);
                            if hand_split {
                                caption.push_str(match grid.hand(i) {
                                    groovepan::sequencer::Hand::Left => " L",
                                    groovepan::sequencer::Hand::Right => " R",
                                });
                            }
                            ui.label(caption);

                            let label = grid.get(i);
                            let is_current = is_playing && self.current_visual_step == Some(i);
                            let text = if label.is_empty() { "·" } else { label.as_str() };
                            let fill = if is_current {
                                egui::Color32::from_rgb(100, 200, 100)
                            } else {
                                label_color(label)
                            };
                            let stroke = if selected == Some(i) {
                                egui::Stroke::new(3.0, egui::Color32::WHITE)
                            } else if grid.is_downbeat(i) {
                                egui::Stroke::new(1.0, egui::Color32::GRAY)
                            } else {
                                egui::Stroke::NONE
                            };
                            let button = egui::Button::new(egui::RichText::new(text).size(20.0))
                                .min_size(egui::vec2(44.0, 44.0))
                                .fill(fill)
                                .stroke(stroke);
                            if ui.add(button).clicked() {
                                clicked = Some(i);
                            }
                        });
                    }
                });
                ui.add_space(6.0);
            }
        });

        if let Some(i) = clicked {
            self.sequencer.toggle_selection(i);
        }

        ui.horizontal(|ui| {
            if ui.button("+ Add Measure").clicked() {
                self.sequencer.add_measure();
                self.restart_if_playing();
            }
            if ui.button("Clear").clicked() {
                self.sequencer.clear();
            }
            if ui.button("Groove…").clicked() {
                self.groove.open = true;
            }
        });
    }

    fn pad_ui(&mut self, ui: &mut egui::Ui) {
        ui.label("Handpan (tap to play; writes to the selected beat, Alt to stay):");
        let alt = ui.input(|i| i.modifiers.alt);
        ui.horizontal_wrapped(|ui| {
            let mut pads = vec![Label::Ding];
            pads.extend((1..=8).filter_map(Label::tone));
            pads.extend([Label::Tak, Label::Slap]);
            for label in pads {
                let button = egui::Button::new(egui::RichText::new(label.as_str()).size(18.0))
                    .min_size(egui::vec2(40.0, 40.0))
                    .fill(label_color(label));
                if ui.add(button).clicked() {
                    self.strike(label, !alt);
                }
            }
        });
    }

    fn patterns_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let selected_text = if self.selected_pattern.is_empty() {
                "(no saved patterns)".to_string()
            } else {
                self.selected_pattern.clone()
            };
            egui::ComboBox::from_label("Pattern")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for name in &self.pattern_names {
                        ui.selectable_value(&mut self.selected_pattern, name.clone(), name);
                    }
                });

            if ui.button("Load").clicked() {
                self.load_pattern();
            }
            let has_selection = !self.selected_pattern.is_empty();
            if ui.add_enabled(has_selection, egui::Button::new("Rename")).clicked() {
                self.rename_pattern();
            }
            if ui.add_enabled(has_selection, egui::Button::new("Delete")).clicked() {
                self.delete_pattern();
            }
        });

        ui.horizontal(|ui| {
            ui.label("Name:");
            ui.text_edit_singleline(&mut self.name_input);
            if ui.button("Save").clicked() {
                self.save_pattern();
            }
        });

        ui.collapsing("Import / Export JSON", |ui| {
            ui.horizontal(|ui| {
                if ui.button("Export").clicked() {
                    self.export_pattern();
                }
                if ui.button("Import").clicked() {
                    self.import_pattern();
                }
            });
            ui.add(
                egui::TextEdit::multiline(&mut self.json_text)
                    .code_editor()
                    .desired_rows(8),
            );
        });
    }

    fn midi_ui(&mut self, ui: &mut egui::Ui) {
        let mut selected_port_changed = None;
        ui.horizontal(|ui| {
            ui.label("MIDI Output:");
            if self.available_midi_ports.is_empty() {
                ui.label("No MIDI ports available");
            } else {
                egui::ComboBox::from_label("Port")
                    .selected_text(
                        self.selected_port
                            .and_then(|i| self.available_midi_ports.get(i))
                            .map(String::as_str)
                            .unwrap_or("Select port..."),
                    )
                    .show_ui(ui, |ui| {
                        for (i, port_name) in self.available_midi_ports.iter().enumerate() {
                            if ui
                                .selectable_label(self.selected_port == Some(i), port_name)
                                .clicked()
                            {
                                selected_port_changed = Some(i);
                            }
                        }
                    });
            }
        });

        if let Some(port_idx) = selected_port_changed {
            match self.midi_output.connect(port_idx) {
                Ok(()) => self.selected_port = Some(port_idx),
                Err(e) => self.status = Some(e.to_string()),
            }
        }
    }

    fn groove_window(&mut self, ctx: &egui::Context) {
        let mut open = self.groove.open;
        let slots = self.sequencer.grid().len();
        let mut generate = false;

        egui::Window::new("Groove Generator")
            .open(&mut open)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.checkbox(&mut self.groove.manual, "Set counts by hand");
                if self.groove.manual {
                    let limits = self.groove.counts.picker_limits(slots);
                    let counts = &mut self.groove.counts;
                    ui.add(egui::Slider::new(&mut counts.ding, 0..=limits.ding).text("Ding"));
                    ui.add(egui::Slider::new(&mut counts.tak, 0..=limits.tak).text("Tak"));
                    ui.add(egui::Slider::new(&mut counts.slap, 0..=limits.slap).text("Slap"));
                    let c = self.groove.counts;
                    ui.label(groovepan::groove::groove_hint(
                        Some(c.ding),
                        Some(c.tak),
                        Some(c.slap),
                        slots,
                    ));
                } else {
                    egui::ComboBox::from_label("Complexity")
                        .selected_text(self.groove.tier.name())
                        .show_ui(ui, |ui| {
                            for tier in Tier::ALL {
                                ui.selectable_value(&mut self.groove.tier, tier, tier.name());
                            }
                        });
                    ui.label(groovepan::groove::groove_hint(None, None, None, slots));
                }
                ui.checkbox(&mut self.groove.metrical, "Dings on downbeats");
                if ui.button("Go!").clicked() {
                    generate = true;
                }
            });

        self.groove.open = open && self.groove.open;
        if generate {
            self.generate_groove();
        }
    }
}

#[cfg(feature = "gui")]
fn label_color(label: Label) -> egui::Color32 {
    match label {
        Label::Empty => egui::Color32::from_rgb(40, 40, 40),
        Label::Ding => egui::Color32::from_rgb(60, 60, 200),
        Label::Tak => egui::Color32::from_rgb(200, 130, 40),
        Label::Slap => egui::Color32::from_rgb(190, 50, 60),
        Label::Tone(_) => egui::Color32::from_rgb(50, 140, 120),
    }
}

#[cfg(feature = "gui")]
impl eframe::App for GrooveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();
        ctx.set_visuals(if self.prefs.dark_theme {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        self.handle_playback_events();
        self.handle_keys(ctx);

        if let Some(status) = self.status.clone() {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(status);
                    if ui.small_button("✕").clicked() {
                        self.status = None;
                    }
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.prefs.presentation {
                ui.horizontal(|ui| {
                    let text = if self.playback_engine.is_running() { "⏸ Stop" } else { "▶ Play" };
                    if ui.button(text).clicked() {
                        self.toggle_playback();
                    }
                    if ui.button("Exit Presentation").clicked() {
                        self.prefs.presentation = false;
                        self.save_prefs();
                    }
                });
                ui.add_space(10.0);
                self.grid_ui(ui);
                return;
            }

            ui.heading("GroovePan - Handpan Sequencer");
            ui.add_space(10.0);

            self.midi_ui(ui);
            ui.add_space(10.0);

            self.transport_ui(ui);
            ui.add_space(20.0);

            self.grid_ui(ui);
            ui.add_space(10.0);

            self.pad_ui(ui);
            ui.separator();

            self.patterns_ui(ui);

            // Info
            ui.separator();
            ui.label("Click a beat to select it, then press D / T / S / 0-9 (Alt keeps the selection, Backspace clears)");
            if !self.midi_output.is_connected() && self.audio_output.is_silent() {
                ui.colored_label(
                    egui::Color32::YELLOW,
                    "⚠ No audio device or MIDI output - playback is silent",
                );
            }
        });

        self.groove_window(ctx);
    }
}
