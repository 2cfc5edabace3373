// ============================================
// File: crates/subtyl-demo/src/main.rs
// ============================================
//! # SubtylSocket Demo Entry Point
//!
//! ## Creation Reason
//! Small driver binary for the SubtylSocket handshake: proves the
//! four-message exchange end to end over a real transport adapter and
//! measures raw protocol throughput.
//!
//! ## Main Functionality
//! - CLI argument parsing with clap
//! - Logging initialization with tracing
//! - `run`: full handshake + encrypted echo over an in-memory link
//! - `throughput`: handshakes/second and envelope MB/s
//!
//! ## Usage
//! ```bash
//! # Handshake + encrypted echo
//! subtyl-demo run --message "hello there"
//!
//! # Measure protocol throughput
//! subtyl-demo throughput --handshakes 500 --messages 10000 --size 1024
//! ```
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use subtyl_core::channel::SecureChannel;
use subtyl_core::handshake::{Initiator, Responder};
use subtyl_core::protocol::codec::{decode_message, encode_message};
use subtyl_core::protocol::messages::Message;
use subtyl_transport::memory::MemoryLink;
use subtyl_transport::traits::MessageLink;

// ============================================
// CLI Definition
// ============================================

/// SubtylSocket handshake demo and throughput harness.
#[derive(Parser, Debug)]
#[command(name = "subtyl-demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one handshake and an encrypted echo over an in-memory link
    Run {
        /// Plaintext to round-trip through the encrypted channel
        #[arg(short, long, default_value = "hello from the provider side")]
        message: String,
    },

    /// Measure handshake rate and envelope throughput
    Throughput {
        /// Number of full handshakes to run
        #[arg(long, default_value_t = 200)]
        handshakes: u32,

        /// Number of envelopes to encrypt and decrypt
        #[arg(long, default_value_t = 5000)]
        messages: u32,

        /// Plaintext size per envelope in bytes
        #[arg(long, default_value_t = 1024)]
        size: usize,
    },
}

// ============================================
// Main
// ============================================

fn main() {
    let cli = Cli::parse();

    init_logging("info");

    let result = match cli.command {
        Commands::Run { message } => cmd_run(&message),
        Commands::Throughput {
            handshakes,
            messages,
            size,
        } => cmd_throughput(handshakes, messages, size),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ============================================
// Commands
// ============================================

/// Runs one handshake plus an encrypted echo over a memory link pair.
fn cmd_run(message: &str) -> anyhow::Result<()> {
    let (provider_link, consumer_link) = MemoryLink::pair();

    // Consumer side runs on its own thread, the way a real embedding
    // would own one peer per transport dispatcher.
    let consumer = std::thread::spawn(move || -> anyhow::Result<()> {
        let mut responder = Responder::new()?;

        // Drive the handshake until the responder confirms
        while !responder.confirmed() {
            let inbound = consumer_link.recv()?;
            let outcome = responder.handle_raw(&inbound)?;
            if let Some(outbound) = outcome.outbound {
                consumer_link.send(&encode_message(&outbound)?)?;
            }
        }
        info!(session_id = %responder.session_id().expect("confirmed session has an id"),
              "consumer confirmed");

        // Echo one encrypted message back
        let channel = SecureChannel::new(responder.derived_keys().expect("confirmed"));
        let inbound = consumer_link.recv()?;
        let envelope = match decode_message(&inbound)? {
            Message::EncryptedEnvelope(env) => env,
            other => anyhow::bail!("expected envelope, got {}", other.type_name()),
        };
        let plaintext = channel.decrypt(&envelope)?;

        let reply = channel.encrypt(&plaintext)?;
        consumer_link.send(&encode_message(&Message::EncryptedEnvelope(reply))?)?;

        responder.destroy();
        Ok(())
    });

    // Provider side on the main thread
    let mut initiator = Initiator::new()?;
    println!("session:   {}", initiator.session_id());

    let outcome = initiator.start()?;
    provider_link.send(&encode_message(
        &outcome.outbound.expect("start emits handshake-init"),
    )?)?;

    while !initiator.confirmed() {
        let inbound = provider_link.recv()?;
        let outcome = initiator.handle_raw(&inbound)?;
        if let Some(outbound) = outcome.outbound {
            provider_link.send(&encode_message(&outbound)?)?;
        }
    }
    println!("handshake: confirmed");

    let channel = SecureChannel::new(initiator.derived_keys().expect("confirmed"));
    println!("cipher:    {}", channel.algorithm_name());

    let envelope = channel.encrypt(message.as_bytes())?;
    provider_link.send(&encode_message(&Message::EncryptedEnvelope(envelope))?)?;

    let inbound = provider_link.recv()?;
    let echoed = match decode_message(&inbound)? {
        Message::EncryptedEnvelope(env) => env,
        other => anyhow::bail!("expected envelope, got {}", other.type_name()),
    };
    let plaintext = channel.decrypt(&echoed)?;

    println!("echo:      {}", String::from_utf8_lossy(&plaintext));
    anyhow::ensure!(plaintext == message.as_bytes(), "echo mismatch");

    initiator.destroy();
    consumer
        .join()
        .map_err(|_| anyhow::anyhow!("consumer thread panicked"))??;

    println!("ok");
    Ok(())
}

/// Measures handshake rate and envelope throughput in-process.
fn cmd_throughput(handshakes: u32, messages: u32, size: usize) -> anyhow::Result<()> {
    // ========================================
    // Handshake rate
    // ========================================
    let started = Instant::now();
    for _ in 0..handshakes {
        let (initiator, responder) = run_one_handshake()?;
        drop((initiator, responder));
    }
    let elapsed = started.elapsed();
    let rate = f64::from(handshakes) / elapsed.as_secs_f64();

    println!("handshakes:  {handshakes} in {:.3}s ({rate:.0}/s)", elapsed.as_secs_f64());

    // ========================================
    // Envelope throughput
    // ========================================
    let (initiator, responder) = run_one_handshake()?;
    let sender = SecureChannel::new(initiator.derived_keys().expect("confirmed"));
    let receiver = SecureChannel::new(responder.derived_keys().expect("confirmed"));

    let plaintext = vec![0xA5u8; size];
    let started = Instant::now();
    for _ in 0..messages {
        let envelope = sender.encrypt(&plaintext)?;
        let decrypted = receiver.decrypt(&envelope)?;
        debug_assert_eq!(decrypted.len(), size);
    }
    let elapsed = started.elapsed();

    let total_bytes = u64::from(messages) * size as u64;
    let mb_per_sec = (total_bytes as f64 / (1024.0 * 1024.0)) / elapsed.as_secs_f64();

    println!(
        "envelopes:   {messages} x {size} B in {:.3}s ({mb_per_sec:.1} MiB/s)",
        elapsed.as_secs_f64()
    );

    Ok(())
}

/// Drives one full in-process handshake to completion.
fn run_one_handshake() -> anyhow::Result<(Initiator, Responder)> {
    let mut initiator = Initiator::new()?;
    let mut responder = Responder::new()?;

    let init = initiator.start()?.outbound.expect("handshake-init");
    let response = responder.handle(&init)?.outbound.expect("handshake-response");
    let confirm_req = initiator
        .handle(&response)?
        .outbound
        .expect("key-confirmation-request");
    let confirmation = responder
        .handle(&confirm_req)?
        .outbound
        .expect("key-confirmation");
    initiator.handle(&confirmation)?;

    anyhow::ensure!(initiator.confirmed() && responder.confirmed(), "handshake incomplete");
    Ok((initiator, responder))
}

// ============================================
// Helper Functions
// ============================================

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .ok();
}
