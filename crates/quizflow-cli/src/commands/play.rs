//! The `quizflow play` command.
//!
//! Reads one line of input at a time. A line is either a `:command` or an
//! answer; on a choice question only an option number or an option value is
//! accepted. Pending notices are dismissed by a timer racing the next line.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use quizflow_core::model::{QuestionKind, QuestionSet};
use quizflow_core::parser;
use quizflow_core::report::SessionReport;
use quizflow_core::{AdvanceOutcome, AdvancePolicy, Entry, HostRequest, QuizFlow, QuizSession};

use super::Context;

const HELP: &str = "Commands: :next :prev :start :check :reset :retake :quit (or type an answer)";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Next,
    Prev,
    Start,
    Check,
    Reset,
    Retake,
    Quit,
    Help,
    Answer(String),
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        ":next" | ":n" => Input::Next,
        ":prev" | ":p" => Input::Prev,
        ":start" => Input::Start,
        ":check" | ":c" => Input::Check,
        ":reset" => Input::Reset,
        ":retake" => Input::Retake,
        ":quit" | ":q" => Input::Quit,
        ":help" | ":h" => Input::Help,
        _ => Input::Answer(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Intro,
    Quiz,
}

impl From<HostRequest> for Screen {
    fn from(request: HostRequest) -> Self {
        match request {
            HostRequest::Intro => Screen::Intro,
            HostRequest::Quiz => Screen::Quiz,
        }
    }
}

/// How a typed line applies to the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypedAnswer {
    /// Index of the picked option.
    Option(usize),
    Text,
    /// Choice question, but the line names none of its options.
    NotAnOption { count: usize },
}

/// What the loop should do after a quiz input.
enum Step {
    Stay,
    Intro,
    Quit,
}

pub async fn execute(
    ctx: &Context,
    questions: PathBuf,
    output: Option<PathBuf>,
    policy: Option<AdvancePolicy>,
) -> Result<()> {
    anyhow::ensure!(
        !questions.is_dir(),
        "play needs a single question set file, got a directory: {}",
        questions.display()
    );

    let config = ctx.config()?;
    let set = parser::parse_question_set(&questions)?;
    let policy = policy.unwrap_or(config.advance_policy);
    let (_, tracker) = ctx.tracker(&config);

    let session =
        QuizSession::from_question_set(&set, policy).with_notice_ttl(config.notice_ttl());
    let mut flow = QuizFlow::new(session, tracker);
    tracing::debug!(set = %set.id, %policy, "starting play");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut screen = Screen::Intro;
    print!("{}", render_intro(&set, &flow));

    loop {
        let deadline = flow
            .session()
            .notices()
            .current()
            .map(|n| tokio::time::Instant::from_std(n.expires_at));

        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read input")?,
            _ = wait_until(deadline) => {
                flow.notices_mut().dismiss_expired(std::time::Instant::now());
                continue;
            }
        };

        let Some(line) = line else {
            // end of input
            if screen == Screen::Quiz {
                finish(&set, &flow, output.as_deref())?;
            }
            break;
        };

        match screen {
            Screen::Intro => match parse_input(&line) {
                Input::Quit => break,
                Input::Help => println!("{HELP}"),
                Input::Retake => {
                    screen = Screen::from(flow.retake());
                    println!("Participation cleared. Starting over.");
                    print!("{}", render_question(flow.session()));
                }
                _ => match flow.enter() {
                    Entry::Quiz => {
                        screen = Screen::Quiz;
                        print!("{}", render_question(flow.session()));
                    }
                    Entry::AlreadyParticipated => {
                        println!("You have already completed this quiz. Type :retake to start over.");
                    }
                },
            },
            Screen::Quiz => match handle_quiz_input(&mut flow, parse_input(&line)) {
                Step::Stay => {}
                Step::Intro => {
                    finish(&set, &flow, output.as_deref())?;
                    screen = Screen::from(flow.leave());
                    print!("{}", render_intro(&set, &flow));
                }
                Step::Quit => {
                    finish(&set, &flow, output.as_deref())?;
                    break;
                }
            },
        }
    }

    Ok(())
}

async fn wait_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn handle_quiz_input(flow: &mut QuizFlow, input: Input) -> Step {
    match input {
        Input::Next => match flow.advance() {
            AdvanceOutcome::Moved(_) => print!("{}", render_question(flow.session())),
            AdvanceOutcome::Blocked(_) => print_notice(flow),
            AdvanceOutcome::AtEnd => {
                if flow.session().is_complete() {
                    return Step::Intro;
                }
                let session = flow.session();
                let text = format!(
                    "{}/{} questions answered. Answer the rest before finishing.",
                    session.answered_count(),
                    session.flow().len()
                );
                flow.notices_mut().show(text);
                print_notice(flow);
            }
        },
        Input::Prev => {
            if flow.retreat() {
                print!("{}", render_question(flow.session()));
            } else {
                println!("Already at the first question.");
            }
        }
        Input::Start => {
            flow.jump_to_start();
            print!("{}", render_question(flow.session()));
        }
        Input::Check => {
            if let Some(result) = flow.check() {
                println!("[{}] {}", result.verdict.heading(), result.message);
            }
        }
        Input::Reset => {
            flow.reset();
            println!("Answers cleared.");
            print!("{}", render_question(flow.session()));
        }
        Input::Retake => {
            flow.retake();
            println!("Participation cleared. Starting over.");
            print!("{}", render_question(flow.session()));
        }
        Input::Quit => return Step::Quit,
        Input::Help => println!("{HELP}"),
        Input::Answer(text) => {
            if text.trim().is_empty() {
                print!("{}", render_question(flow.session()));
                return Step::Stay;
            }
            let completed = match classify_answer(flow.session(), &text) {
                TypedAnswer::Option(index) => flow.choose_option(index).unwrap_or(false),
                TypedAnswer::Text => flow.answer_current(text),
                TypedAnswer::NotAnOption { count } => {
                    flow.notices_mut()
                        .show(format!("Choose an option number from 1 to {count}."));
                    print_notice(flow);
                    return Step::Stay;
                }
            };
            if let Some(answer) = flow
                .session()
                .current()
                .and_then(|item| flow.session().answer(item.id()))
            {
                println!("Answer saved: {answer}");
            }
            if completed {
                println!("All questions answered. Participation recorded.");
            }
        }
    }
    Step::Stay
}

/// On a choice question, a 1-based option number or an exact option value.
fn classify_answer(session: &QuizSession, text: &str) -> TypedAnswer {
    let Some(QuestionKind::SingleChoice { options, .. }) =
        session.current().map(|item| &item.question.kind)
    else {
        return TypedAnswer::Text;
    };

    let text = text.trim();
    text.parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .filter(|index| *index < options.len())
        .or_else(|| options.iter().position(|option| option.value == text))
        .map_or(
            TypedAnswer::NotAnOption {
                count: options.len(),
            },
            TypedAnswer::Option,
        )
}

fn print_notice(flow: &QuizFlow) {
    if let Some(notice) = flow.session().notices().current() {
        println!("! {}", notice.text);
    }
}

fn finish(set: &QuestionSet, flow: &QuizFlow, output: Option<&Path>) -> Result<()> {
    let report = SessionReport::from_session(set, flow.session());
    print_summary(&report);

    if let Some(path) = output {
        if path.extension().is_some_and(|ext| ext == "md") {
            report.save_markdown(path)?;
        } else {
            report.save_json(path)?;
        }
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn render_intro(set: &QuestionSet, flow: &QuizFlow) -> String {
    let mut lines = vec![String::new(), set.name.clone()];
    if !set.description.is_empty() {
        lines.push(set.description.clone());
    }
    lines.push(format!("{} questions", set.question_count()));
    lines.push(match flow.enter() {
        Entry::Quiz => "Press Enter to start, :quit to exit.".to_string(),
        Entry::AlreadyParticipated => {
            "You have already completed this quiz. Type :retake to start over, :quit to exit."
                .to_string()
        }
    });
    lines.push(String::new());
    lines.join("\n")
}

fn render_question(session: &QuizSession) -> String {
    let Some(item) = session.current() else {
        return "No questions.\n".to_string();
    };
    let question = &item.question;

    let mut header = format!("[{}] {}", item.section_title, item.section_progress());
    if let (Some(overall), Some(answered)) = (session.overall_progress(), session.section_answered())
    {
        header.push_str(&format!(" | overall {overall} | answered {answered}"));
    }
    let mut lines = vec![String::new(), header];
    if item.order_in_section == 1 && !item.section_description.is_empty() {
        lines.push(item.section_description.clone());
    }

    lines.push(format!("({}) {}", question.kind_label(), question.prompt));
    if !question.description.is_empty() {
        lines.push(format!("  {}", question.description));
    }

    let answer = session.answer(item.id());
    match &question.kind {
        QuestionKind::SingleChoice { options, .. } => {
            for (i, option) in options.iter().enumerate() {
                let marker = if answer == Some(option.value.as_str()) {
                    "*"
                } else {
                    " "
                };
                lines.push(format!(" {marker}{}. {}", i + 1, option.label));
            }
        }
        QuestionKind::FreeText { guidance, .. } => {
            if !guidance.is_empty() {
                lines.push(format!("  Hint: {guidance}"));
            }
            if let Some(answer) = answer.filter(|a| !a.trim().is_empty()) {
                lines.push(format!("  Answer: {answer}"));
            }
        }
    }

    if let Some(result) = session.result(item.id()) {
        lines.push(format!("[{}] {}", result.verdict.heading(), result.message));
    }
    if let Some(notice) = session.notices().visible_at(std::time::Instant::now()) {
        lines.push(format!("! {}", notice.text));
    }
    lines.push(String::new());
    lines.join("\n")
}

fn print_summary(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Section", "Question", "Answer", "Result"]);

    for (index, item) in report.items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&item.section_title),
            Cell::new(&item.prompt),
            Cell::new(item.answer.as_deref().unwrap_or("-")),
            Cell::new(
                item.result
                    .as_ref()
                    .map(|r| r.verdict.heading())
                    .unwrap_or("-"),
            ),
        ]);
    }

    println!("\n{table}");
    println!(
        "Answered {}/{} | correct {} | partial {} | incorrect {}",
        report.totals.answered,
        report.totals.total,
        report.totals.correct,
        report.totals.partial,
        report.totals.incorrect
    );
}
