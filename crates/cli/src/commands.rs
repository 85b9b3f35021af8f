// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use chronicle_config::{Config, ConfigManager, ContentConfig, Preferences};
use chronicle_core::{Chapter, Character, ContentBundle, DeletedScene, LoadingState};
use chronicle_loader::{validate_bundle, ContentLoader};
use chronicle_network::ClientConfig;
use clap::ArgMatches;
use console::style;
use std::sync::{Arc, Mutex};

/// Configuration and preferences for one command invocation
pub struct Session {
    manager: ConfigManager,
    config: Config,
}

impl Session {
    pub fn new(manager: ConfigManager, config: Config) -> Self {
        Self { manager, config }
    }

    /// Load all content, printing a progress line per state change
    pub async fn load(&self, as_json: bool) -> Result<()> {
        let bundle = self.load_bundle(!as_json).await?;

        if as_json {
            let json =
                serde_json::to_string_pretty(&bundle).context("Failed to serialize content")?;
            println!("{}", json);
            return Ok(());
        }

        println!("\n{}", style("Content loaded").bold().cyan());
        println!("{}", "=".repeat(60));
        for line in summary_lines(&bundle) {
            println!("{}", line);
        }
        for skipped in &bundle.skipped {
            println!("  {} {}", style("!").yellow().bold(), skipped);
        }

        Ok(())
    }

    /// Load all content and report validation findings
    pub async fn validate(&self) -> Result<()> {
        let bundle = self.load_bundle(false).await?;
        let report = validate_bundle(&bundle);

        for error in &report.errors {
            println!("{} {}", style("error:").red().bold(), error);
        }
        for warning in &report.warnings {
            println!("{} {}", style("warning:").yellow().bold(), warning);
        }
        for skipped in &bundle.skipped {
            println!("{} {}", style("skipped:").yellow().bold(), skipped);
        }

        if !report.is_valid {
            bail!("Content is invalid ({} errors)", report.errors.len());
        }

        println!(
            "{} Content is valid ({} warnings)",
            style("✓").green().bold(),
            report.warnings.len()
        );
        Ok(())
    }

    /// List books in series order
    pub async fn books(&self) -> Result<()> {
        let bundle = self.load_bundle(false).await?;
        let prefs = self.preferences()?;

        if bundle.books.is_empty() {
            println!("No books listed in the manifest.");
            return Ok(());
        }

        for book in &bundle.books {
            let marker = if book.book_number == prefs.current_book {
                style("▶").green().to_string()
            } else {
                " ".to_string()
            };
            println!(
                "{} {}. {} ({} chapters)",
                marker,
                book.book_number,
                style(&book.title).bold(),
                bundle.chapters_for_book(book.book_number).count()
            );
            if let Some(subtitle) = &book.subtitle {
                println!("     {}", subtitle);
            }
        }

        Ok(())
    }

    /// List chapters in reading order, marking the reader's current chapter
    pub async fn chapters(&self, book: Option<u32>) -> Result<()> {
        let bundle = self.load_bundle(false).await?;
        let prefs = self.preferences()?;

        let chapters: Vec<&Chapter> = match book {
            Some(number) => {
                if bundle.book(number).is_none() {
                    bail!("Book {} is not in the content", number);
                }
                bundle.chapters_for_book(number).collect()
            }
            None => bundle.chapters.iter().collect(),
        };

        if chapters.is_empty() {
            println!("No chapters loaded.");
            return Ok(());
        }

        for chapter in chapters {
            let line = chapter_line(chapter, &prefs);
            if is_current_chapter(chapter, &prefs) {
                println!("{}", style(line).green());
            } else {
                println!("{}", line);
            }
        }

        Ok(())
    }

    /// List characters with their relationships
    pub async fn characters(&self) -> Result<()> {
        let bundle = self.load_bundle(false).await?;

        if bundle.characters.is_empty() {
            println!("No characters loaded.");
            return Ok(());
        }

        for character in &bundle.characters {
            println!("{}", style(character_line(character)).bold());
            for relationship in &character.relationships {
                let name = bundle
                    .character(&relationship.character_id)
                    .map(|c| c.name.as_str())
                    .unwrap_or(relationship.character_id.as_str());
                println!("    {} of {}", relationship.kind, name);
            }
        }

        for (from, to) in bundle.dangling_relationships() {
            log::warn!("{} refers to unknown character {}", from, to);
        }

        Ok(())
    }

    /// List deleted scenes, marking the ones locked for this reader
    pub async fn scenes(&self) -> Result<()> {
        let bundle = self.load_bundle(false).await?;
        let prefs = self.preferences()?;

        if bundle.deleted_scenes.is_empty() {
            println!("No deleted scenes loaded.");
            return Ok(());
        }

        for scene in &bundle.deleted_scenes {
            let line = scene_line(scene, &prefs);
            if prefs.can_view(scene.is_premium) {
                println!("{}", line);
            } else {
                println!("{}", style(line).dim());
            }
        }

        Ok(())
    }

    pub fn show_preferences(&self) -> Result<()> {
        let prefs = self.preferences()?;
        for line in preference_lines(&prefs) {
            println!("{}", line);
        }
        Ok(())
    }

    pub fn set_preferences(&self, matches: &ArgMatches) -> Result<()> {
        let premium = matches.get_one::<bool>("premium").copied();
        let book = matches.get_one::<u32>("book").copied();
        let chapter = matches.get_one::<String>("chapter").cloned();
        let clear_chapter = matches.get_flag("clear-chapter");

        if premium.is_none() && book.is_none() && chapter.is_none() && !clear_chapter {
            bail!("Nothing to change; pass --premium, --book, --chapter or --clear-chapter");
        }

        let prefs = self
            .manager
            .preferences()
            .update(|prefs| apply_preferences(prefs, premium, book, chapter, clear_chapter))
            .context("Failed to save preferences")?;

        println!("{} Preferences saved", style("✓").green().bold());
        for line in preference_lines(&prefs) {
            println!("{}", line);
        }
        Ok(())
    }

    pub fn init_config(&self) -> Result<()> {
        let created = self
            .manager
            .initialize()
            .context("Failed to write config file")?;

        if created {
            println!(
                "{} Created {}",
                style("✓").green().bold(),
                self.manager.config_path().display()
            );
        } else {
            println!(
                "Config file already exists at {}",
                self.manager.config_path().display()
            );
        }
        Ok(())
    }

    pub fn show_config(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.config).context("Failed to serialize config")?;
        println!("{}", json);
        Ok(())
    }

    pub fn config_path(&self) -> Result<()> {
        println!("{}", self.manager.config_path().display());
        Ok(())
    }

    fn preferences(&self) -> Result<Preferences> {
        self.manager
            .preferences()
            .load()
            .context("Failed to load preferences")
    }

    fn loader(&self) -> Result<ContentLoader> {
        ContentLoader::from_location(
            &self.config.content.location,
            client_config(&self.config.content),
        )
        .context("Failed to open content location")
    }

    async fn load_bundle(&self, show_progress: bool) -> Result<ContentBundle> {
        let loader = self.loader()?;

        let subscription = show_progress.then(|| {
            let last = Arc::new(Mutex::new(None::<String>));
            loader.on_loading_state_change(move |state| {
                let line = progress_line(state);
                let mut last = last.lock().unwrap_or_else(|e| e.into_inner());
                if last.as_deref() != Some(line.as_str()) {
                    eprintln!("{}", line);
                    *last = Some(line);
                }
            })
        });

        let result = loader.load_all_content().await;
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }

        result.with_context(|| format!("Failed to load content from {}", loader.location()))
    }
}

fn client_config(content: &ContentConfig) -> ClientConfig {
    ClientConfig {
        timeout: content.request_timeout(),
        user_agent: content.user_agent.clone(),
        max_redirects: content.max_redirects,
    }
}

fn apply_preferences(
    prefs: &mut Preferences,
    premium: Option<bool>,
    book: Option<u32>,
    chapter: Option<String>,
    clear_chapter: bool,
) {
    if let Some(premium) = premium {
        prefs.is_premium_user = premium;
    }
    if let Some(book) = book {
        prefs.current_book = book;
    }
    if let Some(chapter) = chapter {
        prefs.current_chapter = Some(chapter);
    }
    if clear_chapter {
        prefs.current_chapter = None;
    }
}

fn progress_line(state: &LoadingState) -> String {
    match &state.error {
        Some(error) if !state.is_loading => format!("[{:>3}%] {}", state.percentage(), error),
        _ => format!("[{:>3}%] {}", state.percentage(), state.current_item),
    }
}

fn summary_lines(bundle: &ContentBundle) -> Vec<String> {
    let mut lines = vec![
        format!("Series:         {}", display_or(&bundle.metadata.series.title, "(untitled)")),
        format!("Books:          {}", bundle.books.len()),
        format!("Chapters:       {}", bundle.chapters.len()),
        format!("Characters:     {}", bundle.characters.len()),
        format!("Deleted scenes: {}", bundle.deleted_scenes.len()),
    ];
    if bundle.is_partial() {
        lines.push(format!("Skipped:        {}", bundle.skipped.len()));
    }
    lines
}

fn is_current_chapter(chapter: &Chapter, prefs: &Preferences) -> bool {
    prefs.current_chapter.as_deref() == Some(chapter.id.as_str())
}

fn chapter_line(chapter: &Chapter, prefs: &Preferences) -> String {
    let marker = if is_current_chapter(chapter, prefs) { "▶" } else { " " };
    let mut line = format!(
        "{} {}.{:<3} {}",
        marker, chapter.book_number, chapter.chapter_number, chapter.title
    );
    if let Some(duration) = &chapter.duration {
        line.push_str(&format!(" [{}]", duration));
    }
    if chapter.has_audio() {
        line.push_str(" ♪");
    }
    line
}

fn character_line(character: &Character) -> String {
    if character.role.is_empty() {
        character.name.clone()
    } else {
        format!("{} ({})", character.name, character.role)
    }
}

fn scene_line(scene: &DeletedScene, prefs: &Preferences) -> String {
    let lock = if prefs.can_view(scene.is_premium) {
        " "
    } else {
        "🔒"
    };
    let tier = if scene.is_premium { "premium" } else { "free" };
    let mut line = format!("{} {} [{}]", lock, scene.title, tier);
    if !scene.chapter_related.is_empty() {
        line.push_str(&format!(" after {}", scene.chapter_related));
    }
    line
}

fn preference_lines(prefs: &Preferences) -> Vec<String> {
    vec![
        format!("Premium:         {}", if prefs.is_premium_user { "yes" } else { "no" }),
        format!("Current book:    {}", prefs.current_book),
        format!(
            "Current chapter: {}",
            prefs.current_chapter.as_deref().unwrap_or("(none)")
        ),
    ]
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
