//! The world aggregate and its entity collections.
//!
//! A [`World`] holds one collection per entity kind. Collections are keyed
//! by [`Collection`], the same key the router uses as a subsection, so the
//! list on screen is always derivable from the current route.
//!
//! Generic CRUD is written once over [`Entity`]; [`EntityRecord`] is the
//! closed enum used where the kind is only known at runtime (editors,
//! routing).

mod entities;
mod fields;
mod record;

pub use entities::{
    Economy, Event, Government, Landmark, Language, Location, MagicSystem, People, Region,
    Religion, Resource, Technology, Tradition,
};
pub use fields::{FieldError, FieldKind, FieldSpec, FieldType, FieldValue, Fields};
pub use record::{EntityId, RecordMeta};

use crate::dispatch::{self, CrudError};
use crate::route::{RouteState, Section};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic contract for every entity kind.
pub trait Entity:
    Fields + Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The collection this kind lives in.
    const COLLECTION: Collection;

    fn items(world: &World) -> &[Self];

    fn items_mut(world: &mut World) -> &mut Vec<Self>;

    fn into_record(self) -> EntityRecord;

    fn from_record(record: EntityRecord) -> Option<Self>;

    fn id(&self) -> EntityId {
        self.meta().id
    }
}

/// Declares the kind ⟷ collection table once and derives everything that
/// has to stay in sync with it.
macro_rules! entity_kinds {
    ($($ty:ident => $variant:ident, $field:ident, $key:literal, $section:ident, $singular:literal;)*) => {
        /// One collection per entity kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum Collection {
            $($variant,)*
        }

        impl Collection {
            pub const ALL: &'static [Collection] = &[$(Collection::$variant,)*];

            /// Subsection key used in routes and serialized worlds.
            pub fn key(&self) -> &'static str {
                match self {
                    $(Collection::$variant => $key,)*
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some(Collection::$variant),)*
                    _ => None,
                }
            }

            /// The section this collection is listed under.
            pub fn section(&self) -> Section {
                match self {
                    $(Collection::$variant => Section::$section,)*
                }
            }

            /// Singular display noun, used in prompts ("location", "magic system").
            pub fn singular(&self) -> &'static str {
                match self {
                    $(Collection::$variant => $singular,)*
                }
            }

            /// The field table of the entity kind stored here.
            pub fn field_specs(&self) -> &'static [FieldSpec] {
                match self {
                    $(Collection::$variant => <$ty as Fields>::field_specs(),)*
                }
            }
        }

        $(
            impl Entity for $ty {
                const COLLECTION: Collection = Collection::$variant;

                fn items(world: &World) -> &[Self] {
                    &world.$field
                }

                fn items_mut(world: &mut World) -> &mut Vec<Self> {
                    &mut world.$field
                }

                fn into_record(self) -> EntityRecord {
                    EntityRecord::$ty(self)
                }

                fn from_record(record: EntityRecord) -> Option<Self> {
                    match record {
                        EntityRecord::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*

        /// A record of any kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum EntityRecord {
            $($ty($ty),)*
        }

        impl EntityRecord {
            /// An empty record of the given kind, with fresh metadata.
            pub fn blank(collection: Collection) -> Self {
                match collection {
                    $(Collection::$variant => EntityRecord::$ty(<$ty>::default()),)*
                }
            }

            pub fn collection(&self) -> Collection {
                match self {
                    $(EntityRecord::$ty(_) => Collection::$variant,)*
                }
            }

            pub fn as_fields(&self) -> &dyn Fields {
                match self {
                    $(EntityRecord::$ty(inner) => inner,)*
                }
            }

            pub fn as_fields_mut(&mut self) -> &mut dyn Fields {
                match self {
                    $(EntityRecord::$ty(inner) => inner,)*
                }
            }
        }

        impl World {
            /// All records of a collection, type-erased.
            pub fn records(&self, collection: Collection) -> Vec<&dyn Fields> {
                match collection {
                    $(Collection::$variant => self.$field.iter().map(|r| r as &dyn Fields).collect(),)*
                }
            }

            /// Number of records in a collection.
            pub fn len_of(&self, collection: Collection) -> usize {
                match collection {
                    $(Collection::$variant => self.$field.len(),)*
                }
            }

            /// Clone a record out of its collection.
            pub fn find(&self, collection: Collection, id: EntityId) -> Option<EntityRecord> {
                match collection {
                    $(Collection::$variant => self
                        .$field
                        .iter()
                        .find(|r| r.id() == id)
                        .cloned()
                        .map(EntityRecord::$ty),)*
                }
            }

            /// Validate and append a record to its collection.
            pub fn add_record(&mut self, record: EntityRecord) -> Result<EntityId, CrudError> {
                match record {
                    $(EntityRecord::$ty(data) => {
                        let (next, id) = dispatch::create(&self.$field, data)?;
                        self.$field = next;
                        Ok(id)
                    })*
                }
            }

            /// Replace the fields of an existing record.
            pub fn update_record(&mut self, id: EntityId, record: EntityRecord) -> Result<(), CrudError> {
                match record {
                    $(EntityRecord::$ty(data) => {
                        self.$field = dispatch::update(&self.$field, id, data)?;
                        Ok(())
                    })*
                }
            }

            /// Remove a record. Returns whether anything was removed.
            pub fn delete_record(&mut self, collection: Collection, id: EntityId) -> bool {
                match collection {
                    $(Collection::$variant => {
                        let before = self.$field.len();
                        self.$field = dispatch::remove(&self.$field, id);
                        self.$field.len() != before
                    })*
                }
            }
        }
    };
}

entity_kinds! {
    Location => Locations, locations, "locations", Geography, "location";
    Region => Regions, regions, "regions", Geography, "region";
    Landmark => Landmarks, landmarks, "landmarks", Geography, "landmark";
    Resource => Resources, resources, "resources", Geography, "resource";
    People => Peoples, peoples, "peoples", Cultures, "people";
    Religion => Religions, religions, "religions", Cultures, "religion";
    Language => Languages, languages, "languages", Cultures, "language";
    Tradition => Traditions, traditions, "traditions", Cultures, "tradition";
    MagicSystem => MagicSystems, magic_systems, "magicSystems", Systems, "magic system";
    Technology => Technologies, technologies, "technologies", Systems, "technology";
    Government => Governments, governments, "governments", Systems, "government";
    Economy => Economies, economies, "economies", Systems, "economy";
    Event => Events, events, "events", History, "historical event";
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// All world-building content of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct World {
    pub locations: Vec<Location>,
    pub regions: Vec<Region>,
    pub landmarks: Vec<Landmark>,
    pub resources: Vec<Resource>,
    pub peoples: Vec<People>,
    pub religions: Vec<Religion>,
    pub languages: Vec<Language>,
    pub traditions: Vec<Tradition>,
    pub magic_systems: Vec<MagicSystem>,
    pub technologies: Vec<Technology>,
    pub governments: Vec<Government>,
    pub economies: Vec<Economy>,
    pub events: Vec<Event>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection the route points at, type-erased.
    ///
    /// A section without a subsection, or a subsection listed under a
    /// different section, yields nothing.
    pub fn active_collection(&self, route: &RouteState) -> Vec<&dyn Fields> {
        match route.subsection {
            Some(collection) if collection.section() == route.section => self.records(collection),
            _ => Vec::new(),
        }
    }

    /// Total number of records across all collections.
    pub fn total_records(&self) -> usize {
        Collection::ALL.iter().map(|c| self.len_of(*c)).sum()
    }

    /// Record counts per collection, in table order.
    pub fn counts(&self) -> Vec<(Collection, usize)> {
        Collection::ALL
            .iter()
            .map(|c| (*c, self.len_of(*c)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}
