// 🎛️ Session Controller - menu state machine
//
// Every handler renders from a fresh snapshot, optionally asks one follow-up
// question, and hands back the next state. Nothing survives between menu
// actions except the store itself; the logged-in identity lives only inside
// one run of the login sub-machine.
//
//   MainMenu ─┬─ 1 → ViewCatalog ────────────┐
//             ├─ 2 → LoginFlow ──────────────┤
//             ├─ 3 → ViewCinemaListings ─────┼─→ MainMenu
//             ├─ 4 → SearchOneCinema ────────┘
//             └─ 5 → Exit (close store)
//
//   LoginFlow: PromptIdentity → ShowOwnReviews ─┬─ Y → ManageReviews → delete | modify
//                                               ├─ E → Export
//                                               └─ N → Done

use crate::console::Console;
use crate::correlation;
use crate::db::EntityStore;
use crate::entities::{Movie, Review};
use crate::error::{Error, Result};
use crate::export::Exporter;
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

const BANNER: &str = "==================== Filmoteca ====================";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    MainMenu,
    ViewCatalog,
    LoginFlow,
    ViewCinemaListings,
    SearchOneCinema,
    Exit,
}

impl State {
    /// Top-level menu entries, in display order
    pub const MENU: [State; 5] = [
        State::ViewCatalog,
        State::LoginFlow,
        State::ViewCinemaListings,
        State::SearchOneCinema,
        State::Exit,
    ];

    pub fn from_choice(choice: i64) -> Option<State> {
        usize::try_from(choice)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| Self::MENU.get(index).copied())
    }

    pub fn title(&self) -> &str {
        match self {
            State::MainMenu => "Main menu",
            State::ViewCatalog => "Show catalog",
            State::LoginFlow => "Log in and review my opinions",
            State::ViewCinemaListings => "Show cinema listings",
            State::SearchOneCinema => "Search one cinema",
            State::Exit => "Exit",
        }
    }
}

/// Steps of the login sub-machine
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoginStep {
    PromptIdentity,
    ShowOwnReviews { identity: String },
    ManageReviews,
    Export { identity: String, rows: Vec<(String, String)> },
    Done,
    /// Input ended mid-flow
    Quit,
}

pub struct Session<R, W> {
    store: EntityStore,
    console: Console<R, W>,
    exporter: Exporter,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(store: EntityStore, console: Console<R, W>, exporter: Exporter) -> Self {
        Session {
            store,
            console,
            exporter,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn into_output(self) -> W {
        self.console.into_output()
    }

    /// Drive the menu until Exit, then close the store. Returns the writer.
    pub fn run(mut self) -> Result<W> {
        let mut state = State::MainMenu;

        while state != State::Exit {
            state = match self.step(state) {
                Ok(next) => next,
                Err(err) => {
                    warn!("{}; closing store", err);
                    if let Err(close_err) = self.store.close() {
                        warn!("{}", close_err);
                    }
                    return Err(err);
                }
            };
            debug!(?state, "next state");
        }

        self.shutdown()
    }

    /// Run one state's handler and return the state to move to.
    ///
    /// Recoverable failures are shown to the operator and lead back to the
    /// main menu. A console failure is returned as is.
    pub fn step(&mut self, state: State) -> Result<State> {
        let outcome = match state {
            State::MainMenu => self.main_menu(),
            State::ViewCatalog => self.view_catalog(),
            State::LoginFlow => self.login_flow(),
            State::ViewCinemaListings => self.view_cinema_listings(),
            State::SearchOneCinema => self.search_one_cinema(),
            State::Exit => Ok(State::Exit),
        };

        match outcome {
            Ok(next) => Ok(next),
            Err(err) if err.is_recoverable() => {
                match &err {
                    Error::InvalidChoice(_) => debug!("{}", err),
                    _ => warn!(?state, "{}", err),
                }
                self.console.say(format!("❌ {}", err))?;
                Ok(State::MainMenu)
            }
            Err(err) => Err(err),
        }
    }

    fn shutdown(self) -> Result<W> {
        let Session {
            store, mut console, ..
        } = self;

        console.say("Bye!")?;
        store.close()?;

        Ok(console.into_output())
    }

    // ========================================================================
    // MAIN MENU
    // ========================================================================

    fn main_menu(&mut self) -> Result<State> {
        self.console.say(BANNER)?;
        for (index, entry) in State::MENU.iter().enumerate() {
            self.console.say(format!("{}. {}", index + 1, entry.title()))?;
        }
        self.console.say(BANNER)?;

        let prompt = format!("Choose an option (1-{}): ", State::MENU.len());
        match self.console.prompt_int(&prompt)? {
            None => Ok(State::Exit),
            Some(choice) => State::from_choice(choice)
                .ok_or_else(|| Error::InvalidChoice(format!("{} is not on the menu", choice))),
        }
    }

    // ========================================================================
    // CATALOG
    // ========================================================================

    fn view_catalog(&mut self) -> Result<State> {
        let snapshot = self.store.snapshot()?;

        if snapshot.movies.is_empty() {
            self.console.say("Nothing in the catalog to show.")?;
            return Ok(State::MainMenu);
        }

        self.console.say("My catalog:")?;
        for (movie, reviews) in correlation::catalog(&snapshot.movies, &snapshot.reviews) {
            self.say_movie(movie)?;
            self.console.say("  Reviews:")?;
            if reviews.is_empty() {
                self.console.say("    (none)")?;
            }
            for review in reviews {
                self.console
                    .say(format!("    - {}: {}", review.author, review.text))?;
            }
        }

        Ok(State::MainMenu)
    }

    // ========================================================================
    // LOGIN FLOW
    // ========================================================================

    fn login_flow(&mut self) -> Result<State> {
        let mut step = LoginStep::PromptIdentity;

        loop {
            step = match step {
                LoginStep::PromptIdentity => match self.console.prompt("user: ")? {
                    Some(identity) => {
                        self.console
                            .say(format!("Logged in as '{}'.", identity))?;
                        LoginStep::ShowOwnReviews { identity }
                    }
                    None => LoginStep::Quit,
                },
                LoginStep::ShowOwnReviews { identity } => self.show_own_reviews(identity)?,
                LoginStep::ManageReviews => self.manage_reviews()?,
                LoginStep::Export { identity, rows } => {
                    let path = self.exporter.export(&identity, &rows)?;
                    self.console
                        .say(format!("✅ Reviews exported to {}", path.display()))?;
                    LoginStep::Done
                }
                LoginStep::Done => return Ok(State::MainMenu),
                LoginStep::Quit => return Ok(State::Exit),
            };
        }
    }

    fn show_own_reviews(&mut self, identity: String) -> Result<LoginStep> {
        let snapshot = self.store.snapshot()?;

        if snapshot.movies.is_empty() {
            self.console.say("Nothing in the catalog to show.")?;
            return Ok(LoginStep::Done);
        }

        let own = correlation::reviewed_movies_for_user(&snapshot.movies, &snapshot.reviews, &identity);
        if own.is_empty() {
            self.console
                .say("You have no reviews registered for any movie.")?;
            return Ok(LoginStep::Done);
        }

        let mut rows = Vec::new();
        for (movie, reviews) in own {
            self.say_movie(movie)?;
            self.console.say("  Your reviews:")?;
            for review in reviews {
                self.console
                    .say(format!("    review #{}: {}", review.id, review.text))?;
                rows.push((review.movie_title.clone(), review.text.clone()));
            }
        }

        let answer = match self
            .console
            .prompt("Change any of your reviews? (Y/N/E = export): ")?
        {
            Some(answer) => answer.to_uppercase(),
            None => return Ok(LoginStep::Quit),
        };

        match answer.as_str() {
            "Y" => Ok(LoginStep::ManageReviews),
            "E" => Ok(LoginStep::Export { identity, rows }),
            "N" => Ok(LoginStep::Done),
            other => Err(Error::InvalidChoice(format!("'{}' (expected Y, N or E)", other))),
        }
    }

    fn manage_reviews(&mut self) -> Result<LoginStep> {
        self.console.say("Manage reviews:")?;

        let id = match self.console.prompt_int("review id to modify/delete: ")? {
            Some(id) => id,
            None => return Ok(LoginStep::Quit),
        };
        let review: Review = self.store.get(id)?;

        match self.console.prompt_int("(0) Delete / (1) Modify: ")? {
            Some(0) => self.delete_review(review),
            Some(1) => self.modify_review(review),
            Some(other) => Err(Error::InvalidChoice(format!("{} (expected 0 or 1)", other))),
            None => Ok(LoginStep::Quit),
        }
    }

    fn delete_review(&mut self, review: Review) -> Result<LoginStep> {
        self.console
            .say(format!("Deleting review #{}: '{}'", review.id, review.text))?;

        self.store.delete::<Review>(review.id)?;
        info!(id = review.id, author = %review.author, "review deleted");

        self.console.say("✅ Deleted.")?;
        Ok(LoginStep::Done)
    }

    fn modify_review(&mut self, review: Review) -> Result<LoginStep> {
        let text = match self.console.prompt("New review: ")? {
            Some(text) => text,
            None => return Ok(LoginStep::Quit),
        };

        self.store
            .update(review.id, |r: &mut Review| r.text = text)?;
        info!(id = review.id, author = %review.author, "review modified");

        self.console.say("✅ Review updated.")?;
        Ok(LoginStep::Done)
    }

    // ========================================================================
    // CINEMAS
    // ========================================================================

    fn view_cinema_listings(&mut self) -> Result<State> {
        let snapshot = self.store.snapshot()?;
        let program = correlation::cinema_program(&snapshot.listings, &snapshot.movies);

        if program.is_empty() {
            self.console.say("No cinema listings to show.")?;
            return Ok(State::MainMenu);
        }

        for (cinema, movies) in program {
            self.console.say(format!("🎟️  {}", cinema))?;
            if movies.is_empty() {
                self.console.say("  (no known movies)")?;
            }
            for movie in movies {
                self.say_movie_indented(movie)?;
            }
        }

        Ok(State::MainMenu)
    }

    fn search_one_cinema(&mut self) -> Result<State> {
        let cinema = match self.console.prompt("cinema: ")? {
            Some(cinema) => cinema,
            None => return Ok(State::Exit),
        };

        let snapshot = self.store.snapshot()?;
        let movies = correlation::movies_for_cinema(&snapshot.listings, &snapshot.movies, &cinema);

        if movies.is_empty() {
            self.console
                .say(format!("No movies found for cinema '{}'.", cinema))?;
            return Ok(State::MainMenu);
        }

        self.console.say(format!("🎟️  {}", cinema))?;
        for movie in &movies {
            self.say_movie_indented(movie)?;
        }

        let answer = match self.console.prompt("Export this listing? (E = export, Enter = back): ")? {
            Some(answer) => answer.to_uppercase(),
            None => return Ok(State::Exit),
        };

        if answer == "E" {
            let rows: Vec<(&str, &str, &str, i32)> = movies
                .iter()
                .map(|m| (cinema.as_str(), m.title.as_str(), m.director.as_str(), m.year))
                .collect();
            let path = self.exporter.export(&cinema, &rows)?;
            self.console
                .say(format!("✅ Listing exported to {}", path.display()))?;
        }

        Ok(State::MainMenu)
    }

    // ========================================================================
    // RENDER HELPERS
    // ========================================================================

    fn say_movie(&mut self, movie: &Movie) -> Result<()> {
        self.console
            .say(format!("movie #{}: {}", movie.id, movie.headline()))
    }

    fn say_movie_indented(&mut self, movie: &Movie) -> Result<()> {
        self.console
            .say(format!("  - movie #{}: {}", movie.id, movie.headline()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EntityKind, Listing};
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    type TestSession = Session<Cursor<Vec<u8>>, Vec<u8>>;

    fn seeded_store() -> EntityStore {
        let store = EntityStore::open_in_memory().unwrap();
        store.insert(&Movie::new("Matrix", "Wachowski", 1999)).unwrap();
        store.insert(&Movie::new("Dune", "Villeneuve", 2021)).unwrap();
        store.insert(&Movie::new("Alien", "Scott", 1979)).unwrap();
        store.insert(&Review::new("Matrix", "ana", "loved it")).unwrap();
        store.insert(&Review::new("Inception", "bob", "ok")).unwrap();
        store.insert(&Review::new("Dune", "ana", "sandy")).unwrap();
        store.insert(&Review::new("Matrix", "bob", "meh")).unwrap();
        store.insert(&Listing::new("Galaxy", "Matrix")).unwrap();
        store.insert(&Listing::new("Odeon", "Alien")).unwrap();
        store.insert(&Listing::new("Galaxy", "Tenet")).unwrap();
        store.insert(&Listing::new("Galaxy", "Dune")).unwrap();
        store
    }

    fn session(input: &str, export_dir: &Path) -> TestSession {
        let console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        Session::new(seeded_store(), console, Exporter::new(export_dir))
    }

    fn output(session: TestSession) -> String {
        String::from_utf8(session.into_output()).unwrap()
    }

    fn exported_files(dir: &Path) -> Vec<std::path::PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    #[test]
    fn test_menu_choices() {
        assert_eq!(State::from_choice(1), Some(State::ViewCatalog));
        assert_eq!(State::from_choice(2), Some(State::LoginFlow));
        assert_eq!(State::from_choice(5), Some(State::Exit));
        assert_eq!(State::from_choice(0), None);
        assert_eq!(State::from_choice(6), None);
        assert_eq!(State::from_choice(-1), None);
    }

    #[test]
    fn test_catalog_then_exit() {
        let dir = TempDir::new().unwrap();
        let out = String::from_utf8(session("1\n5\n", dir.path()).run().unwrap()).unwrap();

        assert!(out.contains("movie #1: Matrix (Wachowski, 1999)"));
        assert!(out.contains("- ana: loved it"));
        assert!(out.contains("- bob: meh"));
        assert!(!out.contains("Inception"));
        assert!(out.contains("Bye!"));
    }

    #[test]
    fn test_invalid_choices_redisplay_menu() {
        let dir = TempDir::new().unwrap();
        let out = String::from_utf8(session("9\nabc\n5\n", dir.path()).run().unwrap()).unwrap();

        assert_eq!(out.matches("Invalid option").count(), 2);
        // banner printed twice per menu display
        assert_eq!(out.matches(BANNER).count(), 6);
    }

    #[test]
    fn test_garbled_input_redisplays_menu() {
        let dir = TempDir::new().unwrap();
        let console = Console::new(Cursor::new(vec![0xff, 0xfe, b'\n', b'5', b'\n']), Vec::new());
        let s = Session::new(seeded_store(), console, Exporter::new(dir.path()));

        let out = String::from_utf8(s.run().unwrap()).unwrap();

        let invalid = out.find("Invalid option").unwrap();
        let bye = out.find("Bye!").unwrap();
        assert!(invalid < bye);
        assert_eq!(out.matches(BANNER).count(), 4);
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let dir = TempDir::new().unwrap();
        let out = String::from_utf8(session("", dir.path()).run().unwrap()).unwrap();

        assert!(out.contains("Bye!"));
    }

    #[test]
    fn test_login_without_reviews_skips_prompt() {
        let dir = TempDir::new().unwrap();
        let mut s = session("carl\n", dir.path());

        assert_eq!(s.step(State::LoginFlow).unwrap(), State::MainMenu);

        let out = output(s);
        assert!(out.contains("You have no reviews registered for any movie."));
        assert!(!out.contains("Change any of your reviews?"));
    }

    #[test]
    fn test_login_shows_only_own_reviews() {
        let dir = TempDir::new().unwrap();
        let mut s = session("ana\nN\n", dir.path());

        assert_eq!(s.step(State::LoginFlow).unwrap(), State::MainMenu);

        let out = output(s);
        assert!(out.contains("Logged in as 'ana'."));
        assert!(out.contains("review #1: loved it"));
        assert!(out.contains("review #3: sandy"));
        assert!(!out.contains("meh"));
        assert!(!out.contains("Alien"));
    }

    #[test]
    fn test_delete_review() {
        let dir = TempDir::new().unwrap();
        let mut s = session("ana\nY\n1\n0\n", dir.path());

        assert_eq!(s.step(State::LoginFlow).unwrap(), State::MainMenu);

        assert!(s.store().get::<Review>(1).unwrap_err().is_not_found());
        assert_eq!(s.store().count(EntityKind::Review).unwrap(), 3);
        assert!(output(s).contains("Deleting review #1: 'loved it'"));
    }

    #[test]
    fn test_modify_review() {
        let dir = TempDir::new().unwrap();
        let mut s = session("ana\ny\n3\n1\nworth the sand\n", dir.path());
        let before = s.store().scan::<Review>().unwrap();

        assert_eq!(s.step(State::LoginFlow).unwrap(), State::MainMenu);

        let after = s.store().scan::<Review>().unwrap();
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(&after) {
            if old.id == 3 {
                assert_eq!(new.text, "worth the sand");
                assert_eq!(new.author, old.author);
                assert_eq!(new.movie_title, old.movie_title);
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_manage_unknown_id_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let mut s = session("ana\nY\n99\n", dir.path());
        let before = s.store().scan::<Review>().unwrap();

        assert_eq!(s.step(State::LoginFlow).unwrap(), State::MainMenu);

        assert_eq!(s.store().scan::<Review>().unwrap(), before);
        assert!(output(s).contains("review #99 not found"));
    }

    #[test]
    fn test_manage_invalid_action_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut s = session("ana\nY\n1\n7\n", dir.path());
        let before = s.store().scan::<Review>().unwrap();

        assert_eq!(s.step(State::LoginFlow).unwrap(), State::MainMenu);

        assert_eq!(s.store().scan::<Review>().unwrap(), before);
        assert!(output(s).contains("Invalid option"));
    }

    #[test]
    fn test_export_own_reviews() {
        let dir = TempDir::new().unwrap();
        let mut s = session("ana\nE\n", dir.path());

        assert_eq!(s.step(State::LoginFlow).unwrap(), State::MainMenu);

        let files = exported_files(dir.path());
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("ana_"));
        assert_eq!(
            fs::read_to_string(&files[0]).unwrap(),
            "Matrix;loved it\nDune;sandy\n"
        );
        assert!(output(s).contains("Reviews exported to"));
    }

    #[test]
    fn test_cinema_listings_grouped() {
        let dir = TempDir::new().unwrap();
        let mut s = session("", dir.path());

        assert_eq!(s.step(State::ViewCinemaListings).unwrap(), State::MainMenu);

        let out = output(s);
        let galaxy = out.find("Galaxy").unwrap();
        let odeon = out.find("Odeon").unwrap();
        assert!(galaxy < odeon);
        assert!(out.contains("  - movie #1: Matrix (Wachowski, 1999)"));
        assert!(out.contains("  - movie #3: Alien (Scott, 1979)"));
        assert!(!out.contains("Tenet"));
    }

    #[test]
    fn test_search_cinema_and_export() {
        let dir = TempDir::new().unwrap();
        let mut s = session("Galaxy\ne\n", dir.path());

        assert_eq!(s.step(State::SearchOneCinema).unwrap(), State::MainMenu);

        let files = exported_files(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Galaxy_"));
        assert_eq!(
            fs::read_to_string(&files[0]).unwrap(),
            "Galaxy;Matrix;Wachowski;1999\nGalaxy;Dune;Villeneuve;2021\n"
        );
    }

    #[test]
    fn test_search_unknown_cinema_skips_export() {
        let dir = TempDir::new().unwrap();
        let mut s = session("Nowhere\n", dir.path());

        assert_eq!(s.step(State::SearchOneCinema).unwrap(), State::MainMenu);

        assert!(exported_files(dir.path()).is_empty());
        let out = output(s);
        assert!(out.contains("No movies found for cinema 'Nowhere'."));
        assert!(!out.contains("Export this listing?"));
    }

    #[test]
    fn test_failed_export_returns_to_menu() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let mut s = session("ana\nE\n", &missing);

        assert_eq!(s.step(State::LoginFlow).unwrap(), State::MainMenu);

        assert_eq!(s.store().count(EntityKind::Review).unwrap(), 4);
        assert!(output(s).contains("I/O error"));
    }
}
