//! voicegate - runs a synthetic enrollment and verification round trip.
//!
//! Enrolls a synthetic speaker (alternating 150/220Hz fundamentals), then
//! verifies a genuine probe and an impostor probe against the stored
//! profile, printing the score breakdowns.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use voicegate_enroll::{
    AudioBlob, AudioCapture, CaptureError, CaptureStream, Extractor, MemoryProfileStore,
    RawPcmDecoder, SessionConfig, VoiceGate,
};
use voicegate_verify::{EnrollmentLevel, VerificationResult};

const SAMPLE_RATE: u32 = 16000;

/// Synthetic enrollment and verification demo.
#[derive(Parser, Debug)]
#[command(name = "voicegate")]
#[command(about = "Synthetic enrollment and verification demo")]
struct Args {
    /// Enrollment level (standard: 6 phrases, advanced: 12)
    #[arg(short, long, default_value = "standard")]
    level: String,

    /// Phrase catalog language tag
    #[arg(long, default_value = "en")]
    language: String,

    /// Match-acceptance sensitivity, clamped to [0.4, 0.9]
    #[arg(short, long, default_value_t = 0.65)]
    threshold: f64,

    /// Impostor fundamental frequency in Hz
    #[arg(long, default_value_t = 280.0)]
    impostor_hz: f64,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// A synthetic voice the demo "records" from.
#[derive(Clone, Copy)]
struct Tone {
    freq_hz: f64,
    amplitude: f64,
}

struct ToneCapture {
    plan: Vec<Tone>,
    next: AtomicUsize,
}

impl ToneCapture {
    fn new(plan: Vec<Tone>) -> Self {
        Self {
            plan,
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AudioCapture for ToneCapture {
    async fn start(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        let tone = self.plan[i % self.plan.len()];
        Ok(Box::new(ToneStream {
            blob: AudioBlob {
                data: tone_pcm(tone, 3.0),
                mime: "audio/pcm;rate=16000".into(),
            },
        }))
    }
}

struct ToneStream {
    blob: AudioBlob,
}

#[async_trait]
impl CaptureStream for ToneStream {
    async fn stop(self: Box<Self>) -> Result<AudioBlob, CaptureError> {
        Ok(self.blob)
    }

    async fn abort(self: Box<Self>) {}
}

fn tone_pcm(tone: Tone, seconds: f64) -> Vec<u8> {
    let n = (seconds * SAMPLE_RATE as f64) as usize;
    let mut data = Vec::with_capacity(n * 2);
    for i in 0..n {
        let t = i as f64 / SAMPLE_RATE as f64;
        let v = tone.amplitude * (tone.freq_hz * 2.0 * PI * t).sin();
        let s = (v * 32767.0) as i16;
        data.push(s as u8);
        data.push((s >> 8) as u8);
    }
    data
}

fn print_result(label: &str, r: &VerificationResult) {
    println!(
        "{label}: match={} score={:.3} confidence={:.3} (threshold {:.2})",
        r.is_match, r.match_score, r.confidence, r.threshold
    );
    println!(
        "  components: mfcc={:.3} pitch={:.3} energy={:.3} spectral={:.3}",
        r.details.mfcc, r.details.pitch, r.details.energy, r.details.spectral
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    let level = EnrollmentLevel::from_str(&args.level);
    let user = "demo-user";

    let speaker = ToneCapture::new(vec![
        Tone { freq_hz: 150.0, amplitude: 0.5 },
        Tone { freq_hz: 220.0, amplitude: 0.5 },
    ]);
    let store = Arc::new(MemoryProfileStore::new());
    let gate = VoiceGate::new(
        store.clone(),
        Arc::new(speaker),
        Arc::new(RawPcmDecoder::default()),
        Extractor::spawn(),
    );

    let mut session = gate.begin_enrollment(user, level, &args.language)?;
    println!(
        "enrolling '{user}' at level {level} ({} phrases, auto-stop {:?})",
        session.phrases().len(),
        SessionConfig::default().auto_stop,
    );

    let total = session.phrases().len();
    for i in 0..total {
        let phrase = session.current_phrase().unwrap_or_default().to_string();
        let stop = session.stop_handle();
        let (recorded, _) = tokio::join!(session.record_phrase(), async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stop.stop();
        });
        let sample = recorded?;
        println!(
            "  [{:>2}/{total}] \"{phrase}\" quality={:.2}",
            i + 1,
            sample.quality_score
        );
        if i + 1 < total {
            session.skip_phrase()?;
        }
    }

    gate.finish_enrollment(&mut session).await?;
    let profile = gate.set_noise_threshold(user, args.threshold).await?;
    println!(
        "profile stored: {} samples, enrolled_at={:?}, threshold={:.2}",
        profile.enrollment_phrases_count, profile.enrolled_at, profile.noise_threshold
    );
    if args.verbose {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    }

    // Genuine probe: same 150Hz generator the profile was enrolled from.
    let genuine = gate
        .verify_user(user, Duration::from_millis(50))
        .await?
        .expect("profile is enabled");
    print_result("genuine (150Hz)", &genuine);

    // Impostor probe: a different synthetic voice through a separate gate
    // sharing the same profile store.
    let impostor_gate = VoiceGate::new(
        store,
        Arc::new(ToneCapture::new(vec![Tone {
            freq_hz: args.impostor_hz,
            amplitude: 0.15,
        }])),
        Arc::new(RawPcmDecoder::default()),
        Extractor::spawn(),
    );
    let impostor = impostor_gate
        .verify_user(user, Duration::from_millis(50))
        .await?
        .expect("profile is enabled");
    print_result(&format!("impostor ({}Hz)", args.impostor_hz), &impostor);

    session.close();
    Ok(())
}
