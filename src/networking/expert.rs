//! The Chessmaster: chess expert Q&A and trivia
//!
//! Everything here is one completion call with a chess-expert system prompt.
//! Results that are worth keeping go to markdown files in the docs directory:
//!
//! - questions and opening advice → `EXPERT_ANSWERS.md`, numbered entries:
//!
//! ```text
//! #### Question 3
//! **Asked:** 2026-03-04 12:00:00 UTC
//! **Question:** Who was the first world champion?
//!
//! **Answer:**
//! Wilhelm Steinitz.
//!
//! ---
//! ```
//!
//! - jokes and fun facts → `CHESS_JOKES.md` / `CHESS_FUN_FACTS.md`, one
//!   `### N. <date>` block each, skipping a repeat of a recent entry
//! - news → `CHESS_NEWS.md`, one dated block per request
//!
//! Position analysis and puzzles are shown and not kept.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{info, warn};

use crate::core::error::{GameError, GameResult};
use crate::networking::completion::{ChatMessage, ChatRequest, CompletionClient};

pub const ANSWERS_FILE: &str = "EXPERT_ANSWERS.md";
pub const NEWS_FILE: &str = "CHESS_NEWS.md";

const SYSTEM_PROMPT: &str = "You are a chess grandmaster and historian. \
Answer questions about chess clearly and accurately in a few short paragraphs.";

const FUN_FACT_PROMPT: &str = "Give me a unique chess fact or piece of trivia. \
Do not repeat facts about the Queen's movement. \
You may share a historical event, a famous player's achievement, a record, a rule, \
or something from recent chess news. If possible, avoid repeating facts from previous answers.";

const JOKE_PROMPT: &str = "Tell me a short chess joke. \
Do not repeat jokes about pizza or feeding a family. \
If possible, give a joke that hasn't been told before.";

const NEWS_PROMPT: &str = "Provide the latest news in the world of chess. \
Include updates on tournaments, players, and other significant events.";

const OPENING_PROMPT: &str = "Give practical advice for chess openings. \
Include general principles, common mistakes, and tips for improvement.";

const PUZZLE_PROMPT: &str = "Give me a short tactical chess puzzle. \
Put the position on its own line as 'FEN: <fen>', say whose move it is and what \
to look for, then give the answer after a line that reads 'Solution:'.";

/// Longer than move requests: answers are prose
const EXPERT_MAX_TOKENS: u32 = 600;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

static QUESTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#### Question (\d+)\s*$").expect("valid regex"));

static ENTRY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^###\s+(\d+)\.").expect("valid regex"));

static ENTRY_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n-{3,}\n").expect("valid regex"));

static PUZZLE_FEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t*]*FEN[ \t*]*:[ \t*]*`?([^`\n]+?)`?[ \t]*$").expect("valid regex")
});

static PUZZLE_SOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^[ \t*]*solution[ \t*]*:\**").expect("valid regex"));

/// Numbered markdown collections with repeat suppression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Jokes,
    FunFacts,
}

impl Collection {
    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Jokes => "CHESS_JOKES.md",
            Collection::FunFacts => "CHESS_FUN_FACTS.md",
        }
    }

    /// How many of the latest entries a new one is compared against
    pub fn recent_window(self) -> usize {
        match self {
            Collection::Jokes => 50,
            Collection::FunFacts => 20,
        }
    }

    fn preamble(self) -> &'static str {
        match self {
            Collection::Jokes => {
                "# Chess Jokes\n\n_Generated chess jokes. Duplicates within recent entries are skipped._\n\n---\n\n"
            }
            Collection::FunFacts => {
                "# Chess Fun Facts\n\n_Generated fun facts. Duplicates within recent entries are skipped._\n\n---\n\n"
            }
        }
    }
}

/// A puzzle split so the solution can be held back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Everything before the solution
    pub statement: String,
    /// Position named in the statement, unchecked
    pub fen: Option<String>,
    pub solution: Option<String>,
}

impl Puzzle {
    pub fn parse(reply: &str) -> Self {
        let (statement, solution) = match PUZZLE_SOLUTION.find(reply) {
            Some(found) => (
                &reply[..found.start()],
                Some(reply[found.end()..].trim().to_string()).filter(|s| !s.is_empty()),
            ),
            None => (reply, None),
        };
        let fen = PUZZLE_FEN
            .captures(statement)
            .map(|caps| caps[1].trim().to_string());
        Self {
            statement: statement.trim().to_string(),
            fen,
            solution,
        }
    }
}

pub struct ExpertService {
    client: Rc<dyn CompletionClient>,
    model: String,
    temperature: f32,
    docs_dir: PathBuf,
}

impl ExpertService {
    pub fn new(
        client: Rc<dyn CompletionClient>,
        model: impl Into<String>,
        temperature: f32,
        docs_dir: &Path,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
            docs_dir: docs_dir.to_path_buf(),
        }
    }

    pub fn answers_path(&self) -> PathBuf {
        self.docs_dir.join(ANSWERS_FILE)
    }

    pub fn news_path(&self) -> PathBuf {
        self.docs_dir.join(NEWS_FILE)
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.docs_dir.join(collection.file_name())
    }

    /// Answer a question and record it
    ///
    /// A failure to record is logged; the answer is still returned.
    pub fn ask(&self, question: &str) -> GameResult<String> {
        let answer = self.query(question)?;
        if let Err(err) = self.record_answer(question, &answer, Utc::now()) {
            warn!("[EXPERT] Could not save answer: {}", err);
        }
        Ok(answer)
    }

    /// General opening advice, kept with the answers
    pub fn opening_advice(&self) -> GameResult<String> {
        self.ask(OPENING_PROMPT)
    }

    pub fn fun_fact(&self) -> GameResult<String> {
        self.collect(Collection::FunFacts, FUN_FACT_PROMPT)
    }

    pub fn chess_joke(&self) -> GameResult<String> {
        self.collect(Collection::Jokes, JOKE_PROMPT)
    }

    pub fn latest_news(&self) -> GameResult<String> {
        let news = self.query(NEWS_PROMPT)?;
        if let Err(err) = self.record_news(&news, Utc::now()) {
            warn!("[EXPERT] Could not save news: {}", err);
        }
        Ok(news)
    }

    pub fn tactical_puzzle(&self) -> GameResult<Puzzle> {
        self.query(PUZZLE_PROMPT).map(|reply| Puzzle::parse(&reply))
    }

    pub fn analyze_position(&self, fen: &str) -> GameResult<String> {
        self.query(&format!(
            "Analyze this chess position (FEN): {fen}\n\
             Give a brief evaluation, best moves for both sides, and any tactical ideas."
        ))
    }

    fn collect(&self, collection: Collection, prompt: &str) -> GameResult<String> {
        let text = self.query(prompt)?;
        match self.record_entry(collection, &text, Utc::now()) {
            Ok(Some(number)) => info!("[EXPERT] Saved {} #{}", collection.file_name(), number),
            Ok(None) => info!("[EXPERT] Skipped a recent repeat in {}", collection.file_name()),
            Err(err) => warn!("[EXPERT] Could not save to {}: {}", collection.file_name(), err),
        }
        Ok(text)
    }

    fn query(&self, prompt: &str) -> GameResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            temperature: self.temperature,
            max_tokens: Some(EXPERT_MAX_TOKENS),
        };
        let answer = self.client.complete(&request)?;
        if answer.trim().is_empty() {
            return Err(GameError::AiRequest {
                message: "the expert returned an empty answer".to_string(),
            });
        }
        Ok(answer)
    }

    /// Append one numbered entry to the answers file
    pub fn record_answer(
        &self,
        question: &str,
        answer: &str,
        asked_at: DateTime<Utc>,
    ) -> GameResult<u64> {
        let path = self.answers_path();
        let number = next_question_number(&read_existing(&path)?);
        let entry = format!(
            "#### Question {number}\n**Asked:** {}\n**Question:** {question}\n\n**Answer:**\n{answer}\n\n---\n\n",
            asked_at.format(TIMESTAMP_FORMAT)
        );
        append(&path, &entry)?;

        info!("[EXPERT] Saved question {} to {:?}", number, path);
        Ok(number)
    }

    /// Append `body` to a collection as the next numbered block
    ///
    /// `Ok(None)` when it repeats one of the collection's recent entries,
    /// compared case-insensitively with whitespace collapsed.
    pub fn record_entry(
        &self,
        collection: Collection,
        body: &str,
        at: DateTime<Utc>,
    ) -> GameResult<Option<u64>> {
        let path = self.collection_path(collection);
        let existing = read_existing(&path)?;

        let wanted = normalize(body);
        if recent_bodies(&existing, collection.recent_window())
            .any(|seen| normalize(seen) == wanted)
        {
            return Ok(None);
        }

        let number = ENTRY_HEADING
            .captures_iter(&existing)
            .filter_map(|caps| caps[1].parse::<u64>().ok())
            .max()
            .map_or(1, |n| n.saturating_add(1));
        let mut block = String::new();
        if existing.is_empty() {
            block.push_str(collection.preamble());
        }
        block.push_str(&format!(
            "### {number}. {}\n\n{}\n\n---\n\n",
            at.format(TIMESTAMP_FORMAT),
            body.trim()
        ));
        append(&path, &block)?;
        Ok(Some(number))
    }

    /// Append a dated news block
    pub fn record_news(&self, news: &str, at: DateTime<Utc>) -> GameResult<()> {
        let path = self.news_path();
        append(
            &path,
            &format!("### {}\n{}\n\n---\n\n", at.format(TIMESTAMP_FORMAT), news.trim()),
        )?;
        info!("[EXPERT] Saved news to {:?}", path);
        Ok(())
    }
}

/// Bodies of the last `window` blocks, preamble included
fn recent_bodies(text: &str, window: usize) -> impl Iterator<Item = &str> {
    let entries: Vec<&str> = ENTRY_SEPARATOR
        .split(text)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();
    let skip = entries.len().saturating_sub(window);
    entries.into_iter().skip(skip).map(|entry| {
        entry
            .split_once("\n\n")
            .map_or(entry, |(_, body)| body)
            .trim()
    })
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Contents of `path`, empty when it does not exist yet
fn read_existing(path: &Path) -> GameResult<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(GameError::io(path, e)),
    }
}

fn append(path: &Path, text: &str) -> GameResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GameError::io(parent, e))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| GameError::io(path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| GameError::io(path, e))
}

/// One past the last `#### Question N` heading in `text`
fn next_question_number(text: &str) -> u64 {
    QUESTION_HEADING
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .last()
        .map_or(1, |n| n.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;

    struct FixedClient {
        reply: String,
        seen: RefCell<Vec<ChatRequest>>,
    }

    impl CompletionClient for FixedClient {
        fn complete(&self, request: &ChatRequest) -> GameResult<String> {
            self.seen.borrow_mut().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn service(dir: &Path, reply: &str) -> (ExpertService, Rc<FixedClient>) {
        let client = Rc::new(FixedClient {
            reply: reply.to_string(),
            seen: RefCell::new(Vec::new()),
        });
        let service = ExpertService::new(client.clone(), "expert-model", 0.5, dir);
        (service, client)
    }

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).single().expect("valid time")
    }

    #[test]
    fn test_questions_are_numbered_in_sequence() {
        //! Each saved answer continues from the last heading in the file
        let dir = tempfile::tempdir().expect("temp dir");
        let (expert, _) = service(dir.path(), "Steinitz.");

        assert_eq!(expert.record_answer("First?", "One.", when()).expect("saved"), 1);
        assert_eq!(expert.record_answer("Second?", "Two.", when()).expect("saved"), 2);

        let text = fs::read_to_string(expert.answers_path()).expect("written");
        assert!(text.contains("#### Question 2\n**Asked:** 2026-03-04 12:00:00 UTC\n**Question:** Second?"));
        assert!(text.ends_with("**Answer:**\nTwo.\n\n---\n\n"));
    }

    #[test]
    fn test_ask_saves_answer() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (expert, client) = service(&dir.path().join("docs"), "Wilhelm Steinitz.");

        let answer = expert.ask("Who was the first world champion?").expect("answer");
        assert_eq!(answer, "Wilhelm Steinitz.");
        assert!(expert.answers_path().exists());

        let seen = client.seen.borrow();
        assert_eq!(seen[0].model, "expert-model");
        assert_eq!(seen[0].messages[0].role, "system");
    }

    #[test]
    fn test_analysis_and_puzzles_are_not_saved() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (expert, client) = service(dir.path(), "White is better.");

        expert
            .analyze_position("8/8/8/4k3/8/8/4P3/4K3 w - - 0 1")
            .expect("analysis");
        expert.tactical_puzzle().expect("puzzle");

        assert_eq!(fs::read_dir(dir.path()).expect("dir").count(), 0);
        assert!(client.seen.borrow()[0].messages[1]
            .content
            .contains("FEN): 8/8/8/4k3/8/8/4P3/4K3 w - - 0 1"));
    }

    #[test]
    fn test_opening_advice_is_a_saved_answer() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (expert, _) = service(dir.path(), "Control the centre.");
        expert.opening_advice().expect("advice");

        let text = fs::read_to_string(expert.answers_path()).expect("written");
        assert!(text.starts_with("#### Question 1\n"));
        assert!(text.contains("**Question:** Give practical advice for chess openings."));
        assert!(text.contains("Control the centre."));
    }

    #[test]
    fn test_collection_starts_with_preamble() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (expert, _) = service(dir.path(), "");

        assert_eq!(
            expert
                .record_entry(Collection::Jokes, "  Why did the pawn cross?  ", when())
                .expect("saved"),
            Some(1)
        );
        let text = fs::read_to_string(expert.collection_path(Collection::Jokes)).expect("written");
        assert!(text.starts_with("# Chess Jokes\n\n"));
        assert!(text.ends_with("### 1. 2026-03-04 12:00:00 UTC\n\nWhy did the pawn cross?\n\n---\n\n"));
    }

    #[test]
    fn test_recent_repeat_is_skipped() {
        //! Case and spacing do not make a joke new
        let dir = tempfile::tempdir().expect("temp dir");
        let (expert, _) = service(dir.path(), "");

        let first = "The rook said: castle me maybe.";
        assert_eq!(expert.record_entry(Collection::Jokes, first, when()).expect("ok"), Some(1));
        assert_eq!(
            expert
                .record_entry(Collection::Jokes, "the ROOK said:\n castle me   maybe.", when())
                .expect("ok"),
            None
        );
        assert_eq!(
            expert.record_entry(Collection::Jokes, "A different joke.", when()).expect("ok"),
            Some(2)
        );
    }

    #[test]
    fn test_old_fact_may_come_back() {
        //! Facts are only compared against the latest twenty
        let dir = tempfile::tempdir().expect("temp dir");
        let (expert, _) = service(dir.path(), "");

        for n in 0..=Collection::FunFacts.recent_window() {
            expert
                .record_entry(Collection::FunFacts, &format!("Fact number {n}."), when())
                .expect("ok");
        }
        assert_eq!(
            expert
                .record_entry(Collection::FunFacts, "Fact number 0.", when())
                .expect("ok"),
            Some(22)
        );
        assert_eq!(
            expert
                .record_entry(Collection::FunFacts, "Fact number 20.", when())
                .expect("ok"),
            None
        );
    }

    #[test]
    fn test_news_blocks_are_dated() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (expert, _) = service(dir.path(), "");
        expert.record_news("Candidates start Monday.", when()).expect("saved");
        expert.record_news("Candidates start Monday.", when()).expect("saved");

        let text = fs::read_to_string(expert.news_path()).expect("written");
        assert_eq!(
            text,
            "### 2026-03-04 12:00:00 UTC\nCandidates start Monday.\n\n---\n\n".repeat(2)
        );
    }

    #[test]
    fn test_puzzle_solution_is_split_off() {
        let puzzle = Puzzle::parse(
            "White to move and win.\nFEN: 6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1\n\n**Solution:** Rd8#",
        );
        assert_eq!(puzzle.fen.as_deref(), Some("6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1"));
        assert_eq!(puzzle.solution.as_deref(), Some("Rd8#"));
        assert!(!puzzle.statement.contains("Rd8#"));

        let bare = Puzzle::parse("Find the fork.");
        assert_eq!(bare.fen, None);
        assert_eq!(bare.solution, None);
        assert_eq!(bare.statement, "Find the fork.");
    }

    #[test]
    fn test_empty_answer_is_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (expert, _) = service(dir.path(), "   ");
        assert!(expert.ask("Anything?").is_err());
    }

    #[test]
    fn test_next_number_ignores_other_headings() {
        assert_eq!(next_question_number(""), 1);
        assert_eq!(next_question_number("#### Notes\n#### Question 7\ntext\n"), 8);
    }

    #[test]
    fn test_huge_question_number_does_not_overflow() {
        assert_eq!(next_question_number("#### Question 4294967295\n"), 4_294_967_296);
        assert_eq!(
            next_question_number(&format!("#### Question {}\n", u64::MAX)),
            u64::MAX
        );
    }
}
