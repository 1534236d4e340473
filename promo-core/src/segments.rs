//! Working segment list editing.
//!
//! Every edit keeps the identity map consistent with the list: removing a
//! segment forgets its identifier, renaming carries the identifier forward
//! under the new name.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::EditError;
use crate::identity::IdentityMap;
use crate::types::SegmentSpec;

/// Product categories a segment can be mapped to.
pub const CATEGORIES: [&str; 6] = [
    "Спорт и отдых",
    "Электроника",
    "Дом и интерьер",
    "Мода и стиль",
    "Красота и здоровье",
    "Детские товары",
];

pub const ZODIAC_SIGNS: [&str; 12] = [
    "Овен",
    "Телец",
    "Близнецы",
    "Рак",
    "Лев",
    "Дева",
    "Весы",
    "Скорпион",
    "Стрелец",
    "Козерог",
    "Водолей",
    "Рыбы",
];

const NEW_SEGMENT_PREFIX: &str = "Сегмент";

/// Offline segment suggestions for a theme, categories assigned round-robin.
pub fn generate_for_theme(theme: &str) -> Vec<SegmentSpec> {
    let pool: &[&str] = match theme {
        "zodiac" => &ZODIAC_SIGNS,
        "harry-potter" => &["Гриффиндор", "Слизерин", "Когтевран", "Пуффендуй"],
        "seasons" => &["Весна", "Лето", "Осень", "Зима"],
        "colors" => &["Индиго", "Аметист", "Сапфир", "Изумруд"],
        "elements" => &["Огонь", "Вода", "Земля", "Воздух"],
        _ => &["Сегмент A", "Сегмент B"],
    };
    pool.iter()
        .enumerate()
        .map(|(i, name)| SegmentSpec::new(*name, CATEGORIES[i % CATEGORIES.len()]))
        .collect()
}

/// Mutable view over a segment list and its identity map.
pub struct SegmentEditor<'a> {
    segments: &'a mut Vec<SegmentSpec>,
    identity: &'a mut IdentityMap,
}

impl<'a> SegmentEditor<'a> {
    pub fn new(segments: &'a mut Vec<SegmentSpec>, identity: &'a mut IdentityMap) -> Self {
        Self { segments, identity }
    }

    fn position(&self, name: &str) -> Result<usize, EditError> {
        self.segments
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| EditError::UnknownSegment(name.to_string()))
    }

    fn contains(&self, name: &str) -> bool {
        self.segments.iter().any(|s| s.name == name)
    }

    /// Append a placeholder segment and return its name.
    pub fn add(&mut self) -> String {
        let mut index = self.segments.len() + 1;
        let mut name = format!("{NEW_SEGMENT_PREFIX} {index}");
        while self.contains(&name) {
            index += 1;
            name = format!("{NEW_SEGMENT_PREFIX} {index}");
        }
        self.segments.push(SegmentSpec::new(name.clone(), ""));
        name
    }

    /// Append a named segment.
    pub fn add_named(&mut self, name: &str, category: &str) -> Result<(), EditError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditError::EmptyName);
        }
        if self.contains(name) {
            return Err(EditError::DuplicateSegment(name.to_string()));
        }
        self.segments.push(SegmentSpec::new(name, category));
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<SegmentSpec, EditError> {
        let pos = self.position(name)?;
        let removed = self.segments.remove(pos);
        self.identity.remove_name(name);
        Ok(removed)
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), EditError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(EditError::EmptyName);
        }
        let pos = self.position(old)?;
        if old == new {
            return Ok(());
        }
        if self.contains(new) {
            return Err(EditError::DuplicateSegment(new.to_string()));
        }
        self.segments[pos].name = new.to_string();
        self.identity.rekey(old, new);
        Ok(())
    }

    pub fn set_category(&mut self, name: &str, category: &str) -> Result<(), EditError> {
        let pos = self.position(name)?;
        self.segments[pos].category = category.to_string();
        Ok(())
    }

    /// Permute the assigned categories across all segments.
    ///
    /// Segments without a category receive one as well. Returns `false` when
    /// fewer than two categories are assigned and nothing changed.
    pub fn shuffle_categories<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let mut cats: Vec<String> = self
            .segments
            .iter()
            .map(|s| s.category.clone())
            .filter(|c| !c.is_empty())
            .collect();
        if cats.len() <= 1 {
            return false;
        }
        cats.shuffle(rng);
        for (i, segment) in self.segments.iter_mut().enumerate() {
            segment.category = cats[i % cats.len()].clone();
        }
        true
    }

    /// Replace the whole list with theme suggestions.
    ///
    /// The identity map is left alone: a suggestion that reuses a known name
    /// keeps that name's identifier.
    pub fn replace_with_generated(&mut self, theme: &str) -> usize {
        *self.segments = generate_for_theme(theme);
        self.segments.len()
    }
}
