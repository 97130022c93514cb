use std::io::{self, BufRead, Write as _};
use std::path::{Path, PathBuf};
use std::{fs, process};

use anomtrain_cli::{App, Command, GenerateArgs, PlayArgs, SolveArgs};
use anomtrain_core::op::Operation;
use anomtrain_core::render::{section_rows, Row};
use anomtrain_core::score::Answer;
use anomtrain_core::section::{Section, SessionState};
use anomtrain_gen::session::{self, Trainer};
use anomtrain_gen::store::{SessionStore, StoredSession};
use anomtrain_gen::ScheduleSpec;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = App::parse();
    match &app.command {
        Command::Generate(args) => generate(args),
        Command::Solve(args) => solve(args),
        Command::Play(args) => play(args),
        Command::Schema => schema(),
    }
}

fn load_spec(config: Option<&PathBuf>) -> ScheduleSpec {
    config.map_or_else(ScheduleSpec::default, |path| {
        let file = fs::File::open(path).unwrap_or_else(|e| {
            eprintln!("Failed to open {}: {e}", path.display());
            process::exit(1);
        });
        serde_json::from_reader(file).unwrap_or_else(|e| {
            eprintln!("Failed to parse {}: {e}", path.display());
            process::exit(1);
        })
    })
}

fn generate(args: &GenerateArgs) {
    let spec = load_spec(args.config.as_ref());

    fs::create_dir_all(&args.output_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output directory: {e}");
        process::exit(1);
    });

    let sessions = session::generate_sessions(&spec, args.n_sessions).unwrap_or_else(|e| {
        eprintln!("Failed to generate sessions: {e:?}");
        process::exit(1);
    });

    for (id, stored) in sessions.iter().enumerate() {
        let path = args.output_dir.join(format!("{id}.json"));
        let file = fs::File::create(&path).unwrap_or_else(|e| {
            eprintln!("Failed to create {}: {e}", path.display());
            process::exit(1);
        });
        serde_json::to_writer_pretty(file, stored).unwrap_or_else(|e| {
            eprintln!("Failed to write {}: {e}", path.display());
            process::exit(1);
        });
    }

    println!(
        "Generated {} sessions to {}",
        sessions.len(),
        args.output_dir.display()
    );
}

fn solve(args: &SolveArgs) {
    let spec = load_spec(args.config.as_ref());

    let steps: Vec<Operation> = args
        .steps
        .iter()
        .map(|token| {
            token.parse().unwrap_or_else(|e| {
                eprintln!("{e}");
                process::exit(1);
            })
        })
        .collect();

    let verdicts = anomtrain_core::classify(&steps, true, &spec.rule_sets);
    for (rule_set, verdict) in spec.rule_sets.iter().zip(&verdicts) {
        println!(
            "{}: {}",
            rule_set.label,
            if *verdict { "yes" } else { "no" }
        );
    }
}

fn schema() {
    let schema = schemars::schema_for!(ScheduleSpec);
    let rendered = serde_json::to_string_pretty(&schema).unwrap_or_else(|e| {
        eprintln!("Failed to render schema: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

/// JSON-file implementation of the persistence boundary.
struct JsonFileStore {
    path: PathBuf,
}

impl SessionStore for JsonFileStore {
    type Error = io::Error;

    fn load(&self) -> Result<Option<StoredSession>, Self::Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = fs::File::open(&self.path)?;
        serde_json::from_reader(file).map(Some).map_err(io::Error::other)
    }

    fn save(&mut self, session: &StoredSession) -> Result<(), Self::Error> {
        let file = fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, session).map_err(io::Error::other)
    }
}

fn play(args: &PlayArgs) {
    let spec = load_spec(args.config.as_ref());
    let mut store = JsonFileStore {
        path: args.session_file.clone(),
    };

    let mut stored = store
        .load()
        .unwrap_or_else(|e| {
            eprintln!("Failed to load {}: {e}", args.session_file.display());
            process::exit(1);
        })
        .unwrap_or_else(|| {
            StoredSession::new("interactive", SessionState::new(spec.rounds))
        });

    let mut trainer = Trainer::resume(spec, stored.state.clone());
    let mut rng = rand::rng();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        // A resumed session may still owe answers for its last revealed
        // section, even when the round target is already reached.
        let pending = trainer.is_quiz()
            && trainer
                .state
                .sections
                .last()
                .is_some_and(|section| section.score.is_none());

        let section = if pending {
            let Some(section) = trainer.state.sections.last() else {
                break;
            };
            section.clone()
        } else if trainer.state.finished() {
            break;
        } else {
            match trainer.next(&mut rng) {
                Ok(section) => section.clone(),
                Err(session::Error::SessionRestarted) => {
                    println!("No further novel schedule found, session restarts.");
                    persist(&mut store, &mut stored, &trainer.state, &args.session_file);
                    continue;
                }
                Err(session::Error::Finished) => break,
                Err(e) => {
                    eprintln!("Failed to generate a schedule: {e:?}");
                    process::exit(1);
                }
            }
        };
        persist(&mut store, &mut stored, &trainer.state, &args.session_file);

        println!(
            "\nRound {}{}",
            trainer.state.sections.len(),
            trainer
                .state
                .total
                .map_or_else(String::new, |total| format!(" of {total}"))
        );
        print_table(
            &section_rows(&section, &trainer.spec.ops, trainer.spec.uses_second_attribute()),
            trainer.spec.uses_second_attribute(),
        );

        if !trainer.is_quiz() {
            print!("[enter: next, q: quit] ");
            io::stdout().flush().ok();
            let Some(Ok(line)) = lines.next() else { break };
            if line.trim() == "q" {
                break;
            }
            continue;
        }

        let labels: Vec<String> = trainer
            .spec
            .rule_sets
            .iter()
            .map(|rule_set| rule_set.label.clone())
            .collect();
        let answers: Vec<Option<Answer>> =
            labels.iter().map(|label| prompt(label, &mut lines)).collect();

        match trainer.submit(answers) {
            Ok(score) => {
                print_solution(&trainer.spec.rule_sets, trainer.state.sections.last());
                println!(
                    "{} of {} correct ({} sessions total so far)",
                    score.points, score.total, trainer.state.correct
                );
            }
            Err(e) => {
                eprintln!("Submission rejected: {e:?}");
                process::exit(1);
            }
        }
        persist(&mut store, &mut stored, &trainer.state, &args.session_file);
    }

    println!(
        "\nSession finished: {} of {} sections fully correct.",
        trainer.state.correct,
        trainer.state.sections.len()
    );
}

fn persist(
    store: &mut JsonFileStore,
    stored: &mut StoredSession,
    state: &SessionState,
    path: &Path,
) {
    stored.update(state.clone());
    store.save(stored).unwrap_or_else(|e| {
        eprintln!("Failed to save {}: {e}", path.display());
        process::exit(1);
    });
}

fn prompt(label: &str, lines: &mut impl Iterator<Item = io::Result<String>>) -> Option<Answer> {
    loop {
        print!("{label}? [y/n/-] ");
        io::stdout().flush().ok();
        let Some(Ok(line)) = lines.next() else {
            eprintln!("stdin closed");
            process::exit(1);
        };
        match line.trim() {
            "y" | "yes" => return Some(Answer::Yes),
            "n" | "no" => return Some(Answer::No),
            "" | "-" => return Some(Answer::Neither),
            other => println!("Unrecognized answer `{other}`"),
        }
    }
}

fn print_solution(
    rule_sets: &[anomtrain_core::AnomalyRuleSet],
    section: Option<&Section>,
) {
    let Some(section) = section else { return };
    for (rule_set, verdict) in rule_sets.iter().zip(&section.verdicts) {
        println!(
            "  {}: {}",
            rule_set.label,
            if *verdict { "yes" } else { "no" }
        );
    }
}

fn cell(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_table(rows: &[Row], include_b: bool) {
    let header = if include_b {
        format!(
            "{:>3}  {:<16} {:<16} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}",
            "#", "T1", "T2", "A", "a1", "a2", "B", "b1", "b2"
        )
    } else {
        format!(
            "{:>3}  {:<16} {:<16} {:>4} {:>4} {:>4}",
            "#", "T1", "T2", "A", "a1", "a2"
        )
    };
    println!("{header}");

    for row in rows {
        let mut line = format!(
            "{:>3}  {:<16} {:<16} {:>4} {:>4} {:>4}",
            row.step,
            row.t1_text.as_deref().unwrap_or(""),
            row.t2_text.as_deref().unwrap_or(""),
            row.a,
            cell(row.a1),
            cell(row.a2),
        );
        if let Some(second) = row.second {
            line.push_str(&format!(
                " {:>4} {:>4} {:>4}",
                second.b,
                cell(second.b1),
                cell(second.b2)
            ));
        }
        println!("{line}");
    }
}
