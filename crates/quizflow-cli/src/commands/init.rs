//! The `quizflow init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizflow.toml
    if std::path::Path::new("quizflow.toml").exists() {
        println!("quizflow.toml already exists, skipping.");
    } else {
        std::fs::write("quizflow.toml", SAMPLE_CONFIG)?;
        println!("Created quizflow.toml");
    }

    // Create example question set
    std::fs::create_dir_all("question-sets")?;
    let example_path = std::path::Path::new("question-sets/example.toml");
    if example_path.exists() {
        println!("question-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTION_SET)?;
        println!("Created question-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit question-sets/example.toml with your own questions");
    println!("  2. Run: quizflow validate --questions question-sets/example.toml");
    println!("  3. Run: quizflow play --questions question-sets/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizflow configuration

# Where the participation flag is stored.
data_dir = "${HOME}/.local/share/quizflow"
storage_key = "marriage-quiz-participated"

# require-answer | require-check | unrestricted
advance_policy = "require-answer"

# How long notices stay on screen.
notice_ttl_ms = 2200
"#;

const EXAMPLE_QUESTION_SET: &str = r#"[question_set]
id = "example"
name = "Example Question Set"
description = "A short question set to get started"

[[sections]]
id = "holidays"
title = "명절"
description = "명절을 어떻게 보낼지 정해요."

[[sections.questions]]
id = 1
prompt = "명절에는 양가를 어떻게 방문할까요?"
type = "single"
options = ["해마다 번갈아 방문", "각자 본가만 방문"]
correct_answer = "해마다 번갈아 방문"

[[sections.questions]]
id = 2
prompt = "명절 일정을 구체적으로 적어 주세요."
type = "text"
guidance = "방문 순서, 머무는 기간, 준비 분담을 포함해 주세요."
keywords = ["번갈아", "기간", "분담"]

[messages]
choice_correct = "합의한 방식과 일치합니다."
"#;
