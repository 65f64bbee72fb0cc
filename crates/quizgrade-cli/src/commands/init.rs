//! The `quizgrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizgrade.toml
    if std::path::Path::new("quizgrade.toml").exists() {
        println!("quizgrade.toml already exists, skipping.");
    } else {
        std::fs::write("quizgrade.toml", SAMPLE_CONFIG)?;
        println!("Created quizgrade.toml");
    }

    // Create example answers file
    let example_path = std::path::Path::new("answers.example.json");
    if example_path.exists() {
        println!("answers.example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_ANSWERS)?;
        println!("Created answers.example.json");
    }

    println!("\nNext steps:");
    println!("  1. Export OPENAI_API_KEY and/or GEMINI_API_KEY (or edit quizgrade.toml)");
    println!("  2. Run: quizgrade test-service");
    println!("  3. Run: quizgrade grade --answers answers.example.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizgrade configuration

# settings_path = "/path/to/settings.json"
max_retries = 3
retry_delay_ms = 1000

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"
"#;

const EXAMPLE_ANSWERS: &str = r#"[
  {
    "question": "What is the capital of France?",
    "correctAnswer": "Paris",
    "userAnswer": "paris"
  },
  {
    "question": "Who wrote Romeo and Juliet?",
    "correctAnswer": "William Shakespeare",
    "userAnswer": "Shakespeare"
  },
  {
    "question": "What is the largest planet in our solar system?",
    "correctAnswer": "Jupiter",
    "userAnswer": ""
  }
]
"#;
