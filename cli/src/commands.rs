use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use kl_analysis::{
    AvalancheReport, AvalancheScenario, CollisionSearch, SearchEvent, SearchOutcome,
    avalanche_profile, collision_config, collision_probability,
};
use kl_keccak::{KeccakState, Stage};
use kl_sponge::{BlockPermuter, KeccakSponge, KeystreamCipher, SpongeConfig};
use tracing::{info, warn};

use crate::args::{Cli, Command, MessageArgs, SpongeArgs};
use crate::error::CliError;

pub fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Hash { message, length } => {
            let config = cli.sponge.resolve()?;
            let message = message.read()?;
            let mut sponge = KeccakSponge::new(config);
            sponge.absorb(&message)?;
            println!("{}", hex::encode(sponge.squeeze(length)));
        }

        Command::Encrypt {
            message,
            key,
            nonce,
            output,
        } => {
            let cipher = KeystreamCipher::new(cli.sponge.resolve()?);
            let result = cipher.apply(
                key.as_bytes(),
                nonce.as_deref().map(str::as_bytes),
                &message.read()?,
            );
            match output {
                Some(path) => write_file(&path, &result)?,
                None => println!("{}", hex::encode(result)),
            }
        }

        Command::Blocks { input, output, key } => {
            let config = cli.sponge.resolve()?;
            let data = fs::read(&input).map_err(|source| CliError::Read {
                path: input.clone(),
                source,
            })?;

            let mut permuter = BlockPermuter::with_width(config.width(), config.rounds())
                .with_key(key.as_deref().unwrap_or_default().as_bytes());
            info!(
                blocks = data.len().div_ceil(permuter.block_len()),
                block_len = permuter.block_len(),
                rounds = permuter.rounds(),
                "permuting blocks"
            );
            write_file(&output, &permuter.transform(&data))?;
        }

        Command::Avalanche {
            message,
            scenario,
            json,
        } => {
            let reports = match scenario {
                Some(_) if cli.sponge != SpongeArgs::default() => {
                    return Err(CliError::ConflictingScenario);
                }
                Some(scenario) => AvalancheScenario::from(scenario).run()?,
                None => vec![avalanche_profile(
                    cli.sponge.resolve()?,
                    message.as_bytes(),
                )],
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print_avalanche(report);
                }
            }
        }

        Command::Collide {
            input_len,
            digest_len,
            max_attempts,
            seed,
            timeout,
            progress_interval,
            json,
        } => {
            let config = cli.sponge.resolve_or(collision_config)?;
            let mut search = CollisionSearch::new(config, input_len, digest_len)
                .with_max_attempts(max_attempts)
                .with_seed(seed.unwrap_or_else(rand::random));
            search.progress_interval = progress_interval;
            let outcome = collide(search, timeout)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome, digest_len);
            }
        }

        Command::Trace {
            message,
            round,
            length,
        } => trace(cli.sponge.resolve()?, &message, round, length)?,
    }
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn print_avalanche(report: &AvalancheReport) {
    println!(
        "{} rounds, {}-bit state, digest {}",
        report.distances.len() - 1,
        report.state_bits,
        hex::encode(&report.digest)
    );
    let rows = report.distances.iter().zip(report.fractions()).enumerate();
    for (round, (distance, fraction)) in rows {
        println!("  {round:>3} {distance:>6} {:>7.2}%", fraction * 100.0);
    }
}

fn collide(search: CollisionSearch, timeout: Option<u64>) -> Result<SearchOutcome, CliError> {
    info!(
        width = %search.config.width(),
        rounds = search.config.rounds(),
        seed = search.seed,
        "starting collision search"
    );
    let handle = search.spawn();

    if let Some(seconds) = timeout {
        let cancel = handle.cancel_flag();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(seconds));
            cancel.store(true, Ordering::Relaxed);
        });
    }

    for event in handle.events() {
        match event {
            SearchEvent::Progress(progress) => info!(
                attempts = progress.attempts,
                probability = %format_args!("{:.4}%", progress.probability * 100.0),
                "searching"
            ),
            SearchEvent::Finished(_) => break,
        }
    }
    handle.join().map_err(|_| CliError::WorkerPanicked)
}

fn print_outcome(outcome: &SearchOutcome, digest_len: usize) {
    match outcome {
        SearchOutcome::Found(collision) => {
            println!(
                "collision after {} attempts (birthday bound {:.4}%)",
                collision.attempts,
                collision_probability(collision.attempts, digest_len) * 100.0
            );
            println!("digest: {}", hex::encode(&collision.digest));
            println!("first:  {}", hex::encode(&collision.first));
            println!("second: {}", hex::encode(&collision.second));
        }
        SearchOutcome::Exhausted { attempts } => {
            warn!(attempts, "attempt limit reached");
            println!("no collision within {attempts} attempts");
        }
        SearchOutcome::Cancelled { attempts } => {
            println!("search stopped after {attempts} attempts");
        }
    }
}

fn trace(
    config: SpongeConfig,
    message: &MessageArgs,
    only_round: Option<usize>,
    length: usize,
) -> Result<(), CliError> {
    let message = message.read()?;
    let mut sponge = KeccakSponge::new(config);

    let mut permutation = 0;
    sponge.set_step_observer(Some(Box::new(
        move |round: usize, stage: Stage, state: &KeccakState| {
            if round == 0 && stage == Stage::Theta {
                permutation += 1;
                println!("== permutation {permutation}");
            }
            if only_round.is_none_or(|only| only == round) {
                println!("round {round:>2} {:<5} {state:?}", stage.name());
            }
        },
    )));

    sponge.absorb(&message)?;
    let digest = sponge.squeeze(length);
    println!("digest: {}", hex::encode(digest));
    Ok(())
}
