//! Two-level board navigation.
//!
//! The board owns a "home" page whose items are the category pictograms and a
//! store of named categories. Exactly one of them is the current view.

use crate::models::{
    BoardData, BoardError, Category, CategoryRecord, ImageMap, ItemRecord, StorageError,
};
use crate::storage::{create_storage, MalformedLines, StorageType};
use std::path::Path;
use tracing::{debug, error, info};

/// Which page of the board is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    /// Position of the category in the board's category store.
    InCategory(usize),
}

/// Result of selecting a pictogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A category pictogram was chosen and the view switched to it.
    Navigated { name: String },
    /// An item of the current view was chosen.
    Spoken(String),
    /// Nothing matched; the view is unchanged.
    NoMatch,
}

impl Selection {
    /// Text to speak, empty when the selection was not a speech action.
    pub fn speech(&self) -> &str {
        match self {
            Selection::Spoken(text) => text,
            Selection::Navigated { .. } | Selection::NoMatch => "",
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, Selection::Navigated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEdit {
    /// Adds (or renames) a category reachable from home.
    RegisterCategory { image_id: String, name: String },
    /// Adds an item to the category currently in view.
    RegisterItem { image_id: String, text: String },
}

/// Options for reading a board from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Overrides the format inferred from the file extension.
    pub storage_type: Option<StorageType>,
    pub malformed: MalformedLines,
}

#[derive(Debug, Clone)]
pub struct Board {
    home: Category,
    categories: ImageMap<Category>,
    view: View,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            home: Category::new(""),
            categories: ImageMap::new(),
            view: View::Home,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_home(&self) -> bool {
        self.view == View::Home
    }

    fn current(&self) -> &Category {
        match self.view {
            View::Home => &self.home,
            View::InCategory(pos) => self
                .categories
                .get_index(pos)
                .map(|(_, category)| category)
                .unwrap_or(&self.home),
        }
    }

    /// Handles a pictogram press.
    ///
    /// Category pictograms are recognised from any view; item pictograms only
    /// within the current view.
    pub fn select(&mut self, image_id: &str) -> Selection {
        if let Some(pos) = self.categories.position(image_id) {
            self.view = View::InCategory(pos);
            let name = self.current().name().to_string();
            debug!(image_id, category = %name, "entered category");
            return Selection::Navigated { name };
        }

        match self.current().select(image_id) {
            Ok(text) => Selection::Spoken(text.to_string()),
            Err(e) => {
                debug!(error = %e, "selection did not match");
                Selection::NoMatch
            }
        }
    }

    pub fn reset(&mut self) {
        self.view = View::Home;
    }

    /// Image ids shown by the current view, in insertion order.
    pub fn image_ids(&self) -> Vec<String> {
        self.current().image_ids()
    }

    /// Pictograms of the current view with their texts.
    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.current().items()
    }

    /// Name of the current view; home is unnamed.
    pub fn category_name(&self) -> &str {
        self.current().name()
    }

    pub fn has_image(&self, image_id: &str) -> bool {
        self.current().has_image(image_id)
    }

    pub fn category(&self, image_id: &str) -> Option<&Category> {
        self.categories.get(image_id)
    }

    /// Registered categories with their pictogram ids, in registration order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories.iter()
    }

    pub fn apply(&mut self, edit: BoardEdit) -> Result<(), BoardError> {
        match edit {
            BoardEdit::RegisterCategory { image_id, name } => {
                self.register_category(image_id, name);
                Ok(())
            }
            BoardEdit::RegisterItem { image_id, text } => match self.view {
                View::Home => Err(BoardError::NoActiveCategory),
                View::InCategory(pos) => {
                    let (_, category) = self
                        .categories
                        .get_index_mut(pos)
                        .ok_or(BoardError::NoActiveCategory)?;
                    category.add_item(image_id, text);
                    Ok(())
                }
            },
        }
    }

    fn register_category(&mut self, image_id: String, name: String) -> &mut Category {
        self.home.add_item(image_id.clone(), name.clone());
        let category = self
            .categories
            .get_or_insert_with(image_id, || Category::new(name.clone()));
        category.rename(name);
        category
    }

    /// Adds to the current view: at home this registers a category named
    /// `text`, inside a category it adds an item.
    pub fn add_item(&mut self, image_id: impl Into<String>, text: impl Into<String>) {
        let (image_id, text) = (image_id.into(), text.into());
        match self.view {
            View::Home => {
                self.register_category(image_id, text);
            }
            View::InCategory(pos) => {
                if let Some((_, category)) = self.categories.get_index_mut(pos) {
                    category.add_item(image_id, text);
                }
            }
        }
    }

    /// Adds an item to the category with pictogram `category_id`, whatever
    /// the current view.
    pub fn add_item_to(
        &mut self,
        category_id: &str,
        image_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), BoardError> {
        let category = self
            .categories
            .get_mut(category_id)
            .ok_or_else(|| BoardError::UnknownCategory(category_id.to_string()))?;
        category.add_item(image_id, text);
        Ok(())
    }

    /// Builds a board at home from a snapshot.
    pub fn from_data(data: BoardData) -> Self {
        let mut board = Self::new();
        for item in data.loose_items {
            board.home.add_item(item.image_id, item.text);
        }
        for record in data.categories {
            let category = board.register_category(record.image_id, record.name);
            for item in record.items {
                category.add_item(item.image_id, item.text);
            }
        }
        board
    }

    pub fn to_data(&self) -> BoardData {
        let mut data = BoardData::new();
        data.loose_items = self
            .home
            .items()
            .filter(|(image_id, _)| !self.categories.contains_key(image_id))
            .map(|(image_id, text)| ItemRecord {
                image_id: image_id.to_string(),
                text: text.to_string(),
            })
            .collect();
        data.categories = self
            .categories()
            .map(|(image_id, category)| CategoryRecord {
                image_id: image_id.to_string(),
                name: category.name().to_string(),
                items: category
                    .items()
                    .map(|(image_id, text)| ItemRecord {
                        image_id: image_id.to_string(),
                        text: text.to_string(),
                    })
                    .collect(),
            })
            .collect();
        data
    }

    /// Reads a board, surfacing any failure to the caller.
    pub fn try_load(path: &Path, options: LoadOptions) -> Result<Self, StorageError> {
        let storage_type = options
            .storage_type
            .unwrap_or_else(|| StorageType::from_path(path));
        let data = create_storage(storage_type, path, options.malformed).load()?;
        let board = Self::from_data(data);
        info!(
            path = %path.display(),
            format = storage_type.to_str(),
            categories = board.categories.len(),
            "loaded board"
        );
        Ok(board)
    }

    /// Reads a board; on any failure logs the problem and returns an empty
    /// board so the device stays usable.
    pub fn from_file(path: &Path, options: LoadOptions) -> Self {
        Self::try_load(path, options).unwrap_or_else(|e| {
            error!(path = %path.display(), error = %e, "failed to load board, starting empty");
            Self::new()
        })
    }

    /// Replaces this board with the one stored at `path`, see [`Board::from_file`].
    pub fn load_from_file(&mut self, path: &Path, options: LoadOptions) {
        *self = Self::from_file(path, options);
    }

    /// Saves in the format implied by the extension of `path`.
    pub fn write_to_file(&self, path: &Path) -> Result<(), StorageError> {
        self.write_to_file_as(path, StorageType::from_path(path))
    }

    pub fn write_to_file_as(
        &self,
        path: &Path,
        storage_type: StorageType,
    ) -> Result<(), StorageError> {
        create_storage(storage_type, path, MalformedLines::default()).save(&self.to_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{sample_data, TestDir, SAMPLE_BOARD};

    const FOOD: &str = "img/food/plate.png";
    const CLOTHING: &str = "img/clothing/hanger.png";
    const FRIES: &str = "img/food/icons8-french-fries-96.png";
    const SHIRT: &str = "img/clothing/collaredshirt.png";

    fn sample_board() -> Board {
        Board::from_data(sample_data())
    }

    #[test]
    fn test_new_board_is_home() {
        let board = Board::new();
        assert!(board.is_home());
        assert_eq!(board.category_name(), "");
        assert!(board.image_ids().is_empty());
    }

    #[test]
    fn test_load_scenario() {
        let dir = TestDir::new();
        let path = dir.write("board.txt", "img/food.png food\n>img/fries.png french fries\nimg/clothes.png clothing\n");
        let mut board = Board::from_file(&path, LoadOptions::default());

        assert_eq!(board.image_ids(), vec!["img/food.png", "img/clothes.png"]);
        assert_eq!(board.select("img/food.png").speech(), "");
        assert_eq!(board.category_name(), "food");
        assert_eq!(board.select("img/fries.png").speech(), "french fries");

        board.reset();
        assert_eq!(board.category_name(), "");
    }

    #[test]
    fn test_select_category_from_any_view() {
        let mut board = sample_board();
        assert_eq!(
            board.select(FOOD),
            Selection::Navigated { name: "food".to_string() }
        );
        assert_eq!(board.view(), View::InCategory(0));

        // Category pictograms work even while inside another category
        assert!(board.select(CLOTHING).is_navigation());
        assert_eq!(board.category_name(), "clothing");
        assert_eq!(board.view(), View::InCategory(1));
    }

    #[test]
    fn test_select_item_keeps_view() {
        let mut board = sample_board();
        board.select(CLOTHING);
        assert_eq!(board.select(SHIRT), Selection::Spoken("collared shirt".to_string()));
        assert_eq!(board.category_name(), "clothing");
    }

    #[test]
    fn test_items_are_scoped_to_view() {
        let mut board = sample_board();
        board.select(CLOTHING);
        assert_eq!(board.select(FRIES), Selection::NoMatch);
        assert_eq!(board.category_name(), "clothing");

        board.reset();
        assert_eq!(board.select(FRIES), Selection::NoMatch);
        assert!(board.is_home());
    }

    #[test]
    fn test_select_unknown_is_silent() {
        let mut board = sample_board();
        let selection = board.select("img/unknown.png");
        assert_eq!(selection, Selection::NoMatch);
        assert_eq!(selection.speech(), "");
        assert!(board.is_home());
    }

    #[test]
    fn test_reselecting_category_stays() {
        let mut board = sample_board();
        board.select(FOOD);
        assert!(board.select(FOOD).is_navigation());
        assert_eq!(board.category_name(), "food");
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut board = sample_board();
        board.reset();
        assert!(board.is_home());
        board.select(FOOD);
        board.select(FRIES);
        board.reset();
        assert!(board.is_home());
        assert_eq!(board.image_ids(), vec![FOOD, CLOTHING]);
    }

    #[test]
    fn test_add_item_at_home_registers_category() {
        let mut board = Board::new();
        board.add_item("img/new.png", "New Category");

        assert_eq!(board.image_ids(), vec!["img/new.png"]);
        assert!(board.has_image("img/new.png"));
        assert_eq!(
            board.select("img/new.png"),
            Selection::Navigated { name: "New Category".to_string() }
        );
        assert!(board.image_ids().is_empty());
    }

    #[test]
    fn test_add_item_inside_category() {
        let mut board = sample_board();
        board.select(FOOD);
        board.add_item("img/new.png", "New Item");

        assert!(board.has_image("img/new.png"));
        assert_eq!(board.select("img/new.png").speech(), "New Item");
        assert_eq!(board.category("img/food/plate.png").unwrap().len(), 3);

        board.reset();
        assert!(!board.has_image("img/new.png"));
    }

    #[test]
    fn test_register_item_at_home_fails() {
        let mut board = sample_board();
        let result = board.apply(BoardEdit::RegisterItem {
            image_id: "img/x.png".to_string(),
            text: "x".to_string(),
        });
        assert_eq!(result, Err(BoardError::NoActiveCategory));
        assert!(!board.has_image("img/x.png"));
    }

    #[test]
    fn test_register_category_inside_category() {
        let mut board = sample_board();
        board.select(FOOD);
        board
            .apply(BoardEdit::RegisterCategory {
                image_id: "img/toys.png".to_string(),
                name: "toys".to_string(),
            })
            .unwrap();

        assert_eq!(board.category_name(), "food");
        assert!(!board.has_image("img/toys.png"));
        board.reset();
        assert!(board.has_image("img/toys.png"));
    }

    #[test]
    fn test_reregister_category_renames_and_keeps_items() {
        let mut board = sample_board();
        board.add_item(FOOD, "snacks");

        assert_eq!(board.image_ids(), vec![FOOD, CLOTHING]);
        assert_eq!(board.category(FOOD).unwrap().name(), "snacks");
        assert_eq!(board.category(FOOD).unwrap().len(), 2);
        assert_eq!(board.select(FOOD), Selection::Navigated { name: "snacks".to_string() });
    }

    #[test]
    fn test_add_item_to_unknown_category() {
        let mut board = sample_board();
        assert_eq!(
            board.add_item_to("img/none.png", "img/a.png", "a"),
            Err(BoardError::UnknownCategory("img/none.png".to_string()))
        );
    }

    #[test]
    fn test_loose_items_speak_at_home() {
        let mut data = sample_data();
        data.loose_items.push(ItemRecord {
            image_id: "img/hello.png".to_string(),
            text: "hello".to_string(),
        });
        let mut board = Board::from_data(data.clone());

        assert_eq!(board.image_ids()[0], "img/hello.png");
        assert_eq!(board.select("img/hello.png").speech(), "hello");
        assert_eq!(board.to_data(), data);
    }

    #[test]
    fn test_to_data_round_trip() {
        let data = sample_data();
        assert_eq!(Board::from_data(data.clone()).to_data(), data);
    }

    #[test]
    fn test_write_then_load_is_identity() {
        let dir = TestDir::new();
        let mut board = sample_board();
        board.select(FOOD);
        board.add_item("img/food/bread.png", "a slice of bread");

        for name in ["board.txt", "board.json"] {
            let path = dir.path().join(name);
            board.write_to_file(&path).unwrap();

            let mut loaded = Board::new();
            loaded.load_from_file(&path, LoadOptions::default());
            assert_eq!(loaded.to_data(), board.to_data());
            assert!(loaded.is_home());
        }

        let text = std::fs::read_to_string(dir.path().join("board.txt")).unwrap();
        assert!(text.starts_with(SAMPLE_BOARD.lines().next().unwrap()));
        assert!(text.contains(">img/food/bread.png a slice of bread\n"));
    }

    #[test]
    fn test_missing_file_gives_empty_board() {
        let dir = TestDir::new();
        let board = Board::from_file(&dir.path().join("missing.txt"), LoadOptions::default());
        assert!(board.is_home());
        assert!(board.image_ids().is_empty());
        assert!(Board::try_load(&dir.path().join("missing.txt"), LoadOptions::default()).is_err());
    }

    #[test]
    fn test_malformed_file_gives_empty_board() {
        let dir = TestDir::new();
        let path = dir.write("board.txt", "img/food.png food\nbroken\n>img/fries.png fries\n");

        let board = Board::from_file(&path, LoadOptions::default());
        assert!(board.image_ids().is_empty());

        let options = LoadOptions {
            malformed: MalformedLines::Skip,
            ..Default::default()
        };
        let mut board = Board::from_file(&path, options);
        assert_eq!(board.image_ids(), vec!["img/food.png"]);
        board.select("img/food.png");
        assert_eq!(board.select("img/fries.png").speech(), "fries");
    }

    #[test]
    fn test_skipped_whitespace_ids_leave_a_writable_board() {
        let dir = TestDir::new();
        let path = dir.write(
            "board.txt",
            "img/food\tplate.png food\nimg/food.png food\n>img/fries.png fries\n",
        );

        assert!(Board::try_load(&path, LoadOptions::default()).is_err());

        let options = LoadOptions {
            malformed: MalformedLines::Skip,
            ..Default::default()
        };
        let board = Board::try_load(&path, options).unwrap();
        assert_eq!(board.image_ids(), vec!["img/food.png"]);

        let out = dir.path().join("out.txt");
        board.write_to_file(&out).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "img/food.png food\n>img/fries.png fries\n"
        );
    }

    #[test]
    fn test_categories_in_registration_order() {
        let mut board = sample_board();
        board.add_item("img/toys.png", "toys");
        board.add_item(FOOD, "snacks");

        let names: Vec<(&str, &str)> = board
            .categories()
            .map(|(image_id, category)| (image_id, category.name()))
            .collect();
        assert_eq!(
            names,
            vec![(FOOD, "snacks"), (CLOTHING, "clothing"), ("img/toys.png", "toys")]
        );
    }

    #[test]
    fn test_duplicate_category_lines_merge() {
        let mut data = sample_data();
        let mut again = data.categories[0].clone();
        again.name = "meals".to_string();
        again.items.truncate(1);
        again.items[0].text = "fries".to_string();
        data.categories.push(again);

        let mut board = Board::from_data(data);
        assert_eq!(board.image_ids(), vec![FOOD, CLOTHING]);
        assert_eq!(board.select(FOOD), Selection::Navigated { name: "meals".to_string() });
        assert_eq!(board.image_ids().len(), 2);
        assert_eq!(board.select(FRIES).speech(), "fries");
    }

    #[test]
    fn test_load_replaces_existing_board() {
        let dir = TestDir::new();
        let path = dir.write("board.txt", SAMPLE_BOARD);
        let mut board = Board::new();
        board.add_item("img/old.png", "old");
        board.select("img/old.png");

        board.load_from_file(&path, LoadOptions::default());
        assert!(board.is_home());
        assert!(!board.has_image("img/old.png"));
        assert_eq!(board.image_ids(), vec![FOOD, CLOTHING]);
    }

    #[test]
    fn test_storage_type_override() {
        let dir = TestDir::new();
        let path = dir.path().join("board.data");
        sample_board()
            .write_to_file_as(&path, StorageType::Json)
            .unwrap();

        let options = LoadOptions {
            storage_type: Some(StorageType::Json),
            ..Default::default()
        };
        let board = Board::try_load(&path, options).unwrap();
        assert_eq!(board.to_data(), sample_data());
    }
}
