use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use examen::config::{Config, ConfigStore, FileConfigStore};
use examen::generator::{self, Distribution};
use examen::history::HistoryLog;
use examen::question::QuestionBank;
use examen::score::PASS_THRESHOLD_PERCENT;
use examen::session::{Phase, Session};

/// timed multiple-choice assessment runner
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Runs a timed multiple-choice assessment in the terminal: a stratified random draw from the question bank, a countdown that auto-submits on expiry, and a pass/fail result at 60%."
)]
struct Cli {
    /// number of easy questions to draw
    #[clap(long)]
    easy: Option<usize>,

    /// number of moderate questions to draw
    #[clap(long)]
    moderate: Option<usize>,

    /// number of expert questions to draw
    #[clap(long)]
    expert: Option<usize>,

    /// test duration in seconds
    #[clap(short = 's', long)]
    duration_secs: Option<u32>,

    /// path to a question bank json (defaults to the built-in web development bank)
    #[clap(short = 'b', long)]
    bank: Option<String>,

    /// seed for the question shuffle, for a reproducible draw
    #[clap(long)]
    seed: Option<u64>,

    /// override the history log location
    #[clap(long)]
    log: Option<String>,

    /// print statistics over past attempts and exit
    #[clap(long)]
    summary: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log = match &cli.log {
        Some(path) => HistoryLog::with_path(path),
        None => HistoryLog::new(),
    };

    if cli.summary {
        print_summary(&log);
        return Ok(());
    }

    let cfg = FileConfigStore::new().load();
    let distribution = Distribution {
        easy: cli.easy.unwrap_or(cfg.easy),
        moderate: cli.moderate.unwrap_or(cfg.moderate),
        expert: cli.expert.unwrap_or(cfg.expert),
    };
    let duration_secs = cli.duration_secs.unwrap_or(cfg.duration_secs);

    let bank = load_bank(&cli, &cfg)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let test = generator::generate(&bank, &distribution, duration_secs, &mut rng)?;

    println!("{}: {} questions, {} allowed", test.title, test.len(), fmt_secs(duration_secs));
    println!("Answer with 1-4; commands: n(ext), p(rev), g <n>, submit, quit");
    println!();

    let mut session = Session::new();
    let test_id = test.id.clone();
    session.start(test);

    run_quiz(&mut session)?;

    match session.outcome() {
        Some(outcome) => {
            println!();
            if outcome.passed {
                println!("Congratulations! You passed with {}%", outcome.percentage);
            } else {
                println!(
                    "Test completed. You scored {}%. Minimum required: {}%",
                    outcome.percentage, PASS_THRESHOLD_PERCENT
                );
            }
            println!(
                "{}/{} correct in {} ({} warnings)",
                outcome.correct_count,
                outcome.total_questions,
                fmt_secs(outcome.elapsed_secs),
                outcome.warning_count
            );
            let _ = log.append(&test_id, outcome);
        }
        None => println!("Test abandoned; no result recorded."),
    }

    Ok(())
}

fn load_bank(cli: &Cli, cfg: &Config) -> Result<QuestionBank, Box<dyn Error>> {
    match cli.bank.as_ref().or(cfg.bank_path.as_ref()) {
        Some(path) => QuestionBank::from_path(path),
        None => Ok(QuestionBank::builtin()),
    }
}

/// Line-oriented answer loop. The countdown advances from wall-clock
/// time spent between prompts; EOF on stdin submits whatever has been
/// answered so far.
fn run_quiz(session: &mut Session) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut last = Instant::now();

    while session.phase() == Phase::Running {
        let Some(q) = session.current_question() else {
            break;
        };
        let qid = q.id;
        println!(
            "[{}/{}] ({} left, {}/{} answered) {}",
            session.current_index() + 1,
            session.test().map_or(0, |t| t.len()),
            fmt_secs(session.remaining_secs()),
            session.answered_count(),
            session.test().map_or(0, |t| t.len()),
            q.prompt
        );
        for (i, option) in q.options.iter().enumerate() {
            let marker = if session.answer_for(qid) == Some(i) {
                "*"
            } else {
                " "
            };
            println!(" {marker}{}) {option}", i + 1);
        }
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            session.submit();
            break;
        };
        let line = line?;

        let spent = last.elapsed().as_secs() as u32;
        if spent > 0 {
            last += Duration::from_secs(u64::from(spent));
            session.tick(spent);
            if session.phase() != Phase::Running {
                println!("Time is up.");
                break;
            }
        }

        match line.trim() {
            "" => {}
            "n" | "next" => session.next(),
            "p" | "prev" => session.prev(),
            "submit" | "done" => session.submit(),
            "quit" | "q" => break,
            cmd if cmd.starts_with("g ") || cmd.starts_with("goto ") => {
                match cmd.split_whitespace().nth(1).and_then(|n| n.parse::<isize>().ok()) {
                    Some(n) => session.go_to(n - 1),
                    None => println!("usage: g <question number>"),
                }
            }
            choice => match choice.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    session.answer(qid, n - 1);
                    session.next();
                }
                _ => println!("Answer with 1-4, or n/p/g <n>/submit/quit"),
            },
        }
    }

    Ok(())
}

fn print_summary(log: &HistoryLog) {
    match log.summary() {
        Some(summary) => {
            println!("attempts: {}", summary.attempts);
            println!("passed:   {}", summary.passed);
            println!("mean:     {:.1}%", summary.mean_percentage);
            println!("std dev:  {:.1}", summary.std_dev_percentage);
        }
        None => println!("No recorded attempts yet."),
    }
}

fn fmt_secs(secs: u32) -> String {
    format!("{}m{:02}s", secs / 60, secs % 60)
}
