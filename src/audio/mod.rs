/// Audio output using cpal - synthesized handpan voices and metronome clicks
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::warn;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;
use std::f32::consts::TAU;
use std::sync::Arc;

use crate::scale::{midi_note_to_frequency, Scale, Sound};
use crate::sequencer::{ClickKind, Label};

/// Fire-and-forget sound output keyed by label.
pub trait SoundTrigger {
    fn trigger(&mut self, sound: Sound);

    fn click(&mut self, kind: ClickKind);

    /// Sound `label` on `scale`; silent labels do nothing.
    fn play_label(&mut self, label: Label, scale: &Scale) {
        if let Some(sound) = scale.sound_for(label) {
            self.trigger(sound);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Waveform {
    Sine,
    Triangle,
    Square,
    /// White noise through a one-pole high-pass
    Noise,
}

#[derive(Debug, Clone, PartialEq)]
struct Voice {
    waveform: Waveform,
    frequency: f32,
    level: f32,
    /// Seconds until the voice is silent
    length: f32,
    phase: f32,
    age: f32,
    last_noise: f32,
    highpass: f32,
}

impl Voice {
    fn new(waveform: Waveform, frequency: f32, level: f32, length: f32) -> Self {
        Self {
            waveform,
            frequency,
            level,
            length,
            phase: 0.0,
            age: 0.0,
            last_noise: 0.0,
            highpass: 0.0,
        }
    }

    fn for_sound(sound: Sound) -> Self {
        match sound {
            Sound::Ding(note) => Voice::new(Waveform::Sine, midi_note_to_frequency(note), 0.35, 2.0),
            Sound::Tone(note) => Voice::new(Waveform::Sine, midi_note_to_frequency(note), 0.25, 1.2),
            Sound::Tak => Voice::new(Waveform::Triangle, 330.0, 0.18, 0.20),
            Sound::Slap => Voice::new(Waveform::Noise, 800.0, 0.20, 0.06),
        }
    }

    fn for_click(kind: ClickKind) -> Self {
        let (frequency, level) = match kind {
            ClickKind::Downbeat => (1600.0, 0.28),
            ClickKind::Beat => (1300.0, 0.20),
            ClickKind::Sub => (1000.0, 0.12),
        };
        Voice::new(Waveform::Square, frequency, level, 0.03)
    }

    fn is_done(&self) -> bool {
        self.age >= self.length
    }

    /// Short linear attack, then exponential decay to near silence at `length`.
    fn envelope(&self) -> f32 {
        const ATTACK: f32 = 0.003;
        if self.age < ATTACK {
            self.age / ATTACK
        } else {
            (-6.9 * (self.age - ATTACK) / self.length).exp()
        }
    }

    fn next_sample(&mut self, sample_rate: f32, rng: &mut SmallRng) -> f32 {
        let raw = match self.waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Noise => {
                let noise = rng.random_range(-1.0f32..1.0);
                // `frequency` is the high-pass cutoff for noise voices.
                let rc = 1.0 / (TAU * self.frequency);
                let alpha = rc / (rc + 1.0 / sample_rate);
                self.highpass = alpha * (self.highpass + noise - self.last_noise);
                self.last_noise = noise;
                self.highpass
            }
        };

        let sample = raw * self.level * self.envelope();
        self.phase = (self.phase + self.frequency / sample_rate).fract();
        self.age += 1.0 / sample_rate;
        sample
    }
}

pub struct AudioOutput {
    stream: Option<cpal::Stream>,
    voices: Arc<Mutex<Vec<Voice>>>,
}

impl AudioOutput {
    pub fn new() -> Option<Self> {
        let voices = Arc::new(Mutex::new(Vec::new()));
        let stream = Self::setup_audio_stream(Arc::clone(&voices))?;

        Some(Self {
            stream: Some(stream),
            voices,
        })
    }

    /// Output with no device; triggers are accepted and never heard.
    pub fn silent() -> Self {
        Self {
            stream: None,
            voices: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.stream.is_none()
    }

    fn setup_audio_stream(voices: Arc<Mutex<Vec<Voice>>>) -> Option<cpal::Stream> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;
        let config = device.default_output_config().ok()?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = usize::from(config.channels()).max(1);
        let mut rng = SmallRng::from_os_rng();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut voices = voices.lock();
                    for frame in data.chunks_mut(channels) {
                        let mut mixed = 0.0f32;
                        for voice in voices.iter_mut() {
                            mixed += voice.next_sample(sample_rate, &mut rng);
                        }
                        let mixed = mixed.clamp(-1.0, 1.0);
                        frame.fill(mixed);
                    }
                    voices.retain(|v| !v.is_done());
                },
                |err| warn!("audio stream error: {}", err),
                None,
            ),
            format => {
                warn!("unsupported sample format {:?}, audio disabled", format);
                return None;
            }
        };

        match stream {
            Ok(stream) => {
                if let Err(e) = stream.play() {
                    warn!("could not start audio stream: {}", e);
                }
                Some(stream)
            }
            Err(e) => {
                warn!("could not open audio stream: {}", e);
                None
            }
        }
    }

    fn push(&self, voice: Voice) {
        if self.stream.is_some() {
            self.voices.lock().push(voice);
        }
    }

    /// Silence everything currently sounding.
    pub fn stop_all(&mut self) {
        self.voices.lock().clear();
    }
}

impl SoundTrigger for AudioOutput {
    fn trigger(&mut self, sound: Sound) {
        self.push(Voice::for_sound(sound));
    }

    fn click(&mut self, kind: ClickKind) {
        self.push(Voice::for_click(kind));
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new().unwrap_or_else(|| {
            warn!("no audio output device, playback is silent");
            Self::silent()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(voice: &mut Voice, seconds: f32) -> Vec<f32> {
        let mut rng = SmallRng::seed_from_u64(1);
        let sample_rate = 8000.0;
        (0..(seconds * sample_rate) as usize)
            .map(|_| voice.next_sample(sample_rate, &mut rng))
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        sounds: Vec<Sound>,
        clicks: Vec<ClickKind>,
    }

    impl SoundTrigger for Recorder {
        fn trigger(&mut self, sound: Sound) {
            self.sounds.push(sound);
        }

        fn click(&mut self, kind: ClickKind) {
            self.clicks.push(kind);
        }
    }

    #[test]
    fn test_play_label_maps_through_scale() {
        let scale = Scale::by_name("D Kurd");
        let mut recorder = Recorder::default();
        for label in [Label::Ding, Label::Empty, Label::Tak, Label::Tone(9), Label::Tone(2)] {
            recorder.play_label(label, scale);
        }
        recorder.click(ClickKind::Beat);
        assert_eq!(recorder.sounds, vec![Sound::Ding(50), Sound::Tak, Sound::Tone(58)]);
        assert_eq!(recorder.clicks, vec![ClickKind::Beat]);
    }

    #[test]
    fn test_voices_decay_and_finish() {
        for sound in [Sound::Ding(50), Sound::Tone(62), Sound::Tak, Sound::Slap] {
            let mut voice = Voice::for_sound(sound);
            let length = voice.length;
            let samples = render(&mut voice, length + 0.01);
            assert!(voice.is_done(), "{sound:?}");
            assert!(samples.iter().all(|s| s.abs() <= 1.0));
            let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            assert!(peak > 0.01, "{sound:?} is silent");
            let tail = samples.last().copied().unwrap_or_default().abs();
            assert!(tail < peak * 0.05, "{sound:?} tail {tail}");
        }
    }

    #[test]
    fn test_clicks_are_short() {
        let mut voice = Voice::for_click(ClickKind::Downbeat);
        render(&mut voice, 0.05);
        assert!(voice.is_done());
        assert!(Voice::for_click(ClickKind::Downbeat).level > Voice::for_click(ClickKind::Sub).level);
    }

    #[test]
    fn test_silent_output_accepts_triggers() {
        let mut output = AudioOutput::silent();
        assert!(output.is_silent());
        output.play_label(Label::Ding, Scale::by_name("D Amara"));
        output.click(ClickKind::Sub);
        assert!(output.voices.lock().is_empty());
    }
}
