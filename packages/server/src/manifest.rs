//! Declared field manifests, one per content entity type.
//!
//! The lifecycle manager and the submission decoder iterate these manifests
//! instead of reading named form fields by hand in each route.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Every content entity type served under `/api/admin/{entity}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Blogs,
    Courses,
    CurrentAffairs,
    Testimonials,
    Results,
    Sliders,
    Gallery,
    Announcements,
    Scholarships,
    #[serde(rename = "elearnings")]
    ELearnings,
    Settings,
    ResultSection,
}

impl EntityKind {
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Blogs,
        EntityKind::Courses,
        EntityKind::CurrentAffairs,
        EntityKind::Testimonials,
        EntityKind::Results,
        EntityKind::Sliders,
        EntityKind::Gallery,
        EntityKind::Announcements,
        EntityKind::Scholarships,
        EntityKind::ELearnings,
        EntityKind::Settings,
        EntityKind::ResultSection,
    ];

    /// Path segment and stored discriminator.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Blogs => "blogs",
            EntityKind::Courses => "courses",
            EntityKind::CurrentAffairs => "current-affairs",
            EntityKind::Testimonials => "testimonials",
            EntityKind::Results => "results",
            EntityKind::Sliders => "sliders",
            EntityKind::Gallery => "gallery",
            EntityKind::Announcements => "announcements",
            EntityKind::Scholarships => "scholarships",
            EntityKind::ELearnings => "elearnings",
            EntityKind::Settings => "settings",
            EntityKind::ResultSection => "result-section",
        }
    }

    pub fn manifest(self) -> &'static EntityManifest {
        match self {
            EntityKind::Blogs => &BLOGS,
            EntityKind::Courses => &COURSES,
            EntityKind::CurrentAffairs => &CURRENT_AFFAIRS,
            EntityKind::Testimonials => &TESTIMONIALS,
            EntityKind::Results => &RESULTS,
            EntityKind::Sliders => &SLIDERS,
            EntityKind::Gallery => &GALLERY,
            EntityKind::Announcements => &ANNOUNCEMENTS,
            EntityKind::Scholarships => &SCHOLARSHIPS,
            EntityKind::ELearnings => &ELEARNINGS,
            EntityKind::Settings => &SETTINGS,
            EntityKind::ResultSection => &RESULT_SECTION,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            // Older front-end builds used the underscore spelling.
            .or_else(|| (s == "current_affairs").then_some(EntityKind::CurrentAffairs))
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}

/// How a declared field is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `{en, hi}` pair.
    Localized,
    Text,
    Integer,
    Number,
    Bool,
    /// List of strings.
    List,
}

/// Value a plain field takes on create when the submission omits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Wire and storage name (camelCase, as the admin forms send it).
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<FieldDefault>,
    /// Closed set of accepted text values; empty means any.
    pub allowed: &'static [&'static str],
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            allowed: &[],
        }
    }

    const fn localized(name: &'static str) -> Self {
        Self::new(name, FieldKind::Localized)
    }

    const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    const fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    const fn list(name: &'static str) -> Self {
        Self::new(name, FieldKind::List)
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn or(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }
}

/// Form part name of the image slot; `imageAlt` describes this slot.
pub const IMAGE_SLOT: &str = "image";

/// A named file attachment declared by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaSlot {
    /// Multipart part name and key of the stored reference.
    pub field: &'static str,
    pub required: bool,
    /// Object store folder for this slot's files.
    pub namespace: &'static str,
    /// Accepted MIME type prefix.
    pub accepts: &'static str,
}

impl MediaSlot {
    const fn image(namespace: &'static str) -> Self {
        Self {
            field: IMAGE_SLOT,
            required: false,
            namespace,
            accepts: "image/",
        }
    }

    const fn pdf(field: &'static str, namespace: &'static str) -> Self {
        Self {
            field,
            required: false,
            namespace,
            accepts: "application/pdf",
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Human name used in validation messages.
    pub fn label(&self) -> &'static str {
        if self.accepts.starts_with("image/") {
            "an image file"
        } else {
            "a PDF document"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRule {
    None,
    Optional,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugRule {
    None,
    Required,
    /// Generated from the `en` value of the named localized field when omitted.
    DerivedFrom(&'static str),
}

#[derive(Debug)]
pub struct EntityManifest {
    pub kind: EntityKind,
    pub fields: &'static [FieldSpec],
    /// File attachments; empty for entities without media.
    pub media: &'static [MediaSlot],
    pub category: CategoryRule,
    pub subcategory: bool,
    pub slug: SlugRule,
    pub display_order: bool,
    /// Anonymous visitors may create records through the public API.
    pub public_submission: bool,
    /// At most one record exists, edited in place at `/api/admin/{entity}`.
    pub singleton: bool,
}

impl EntityManifest {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn localized_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Localized)
    }

    pub fn plain_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.kind != FieldKind::Localized)
    }

    pub fn media_slot(&self, field: &str) -> Option<&MediaSlot> {
        self.media.iter().find(|slot| slot.field == field)
    }
}

const SEO_FIELDS: [FieldSpec; 8] = [
    FieldSpec::text("metaTitle"),
    FieldSpec::text("metaDescription"),
    FieldSpec::list("metaKeywords"),
    FieldSpec::text("canonicalUrl"),
    FieldSpec::text("ogTitle"),
    FieldSpec::text("ogDescription"),
    FieldSpec::boolean("index").or(FieldDefault::Bool(true)),
    FieldSpec::boolean("follow").or(FieldDefault::Bool(true)),
];

static BLOGS: EntityManifest = EntityManifest {
    kind: EntityKind::Blogs,
    fields: &[
        FieldSpec::localized("title").required(),
        FieldSpec::localized("shortContent"),
        FieldSpec::localized("content").required(),
        FieldSpec::localized("postedBy"),
        FieldSpec::list("tags"),
        SEO_FIELDS[0],
        SEO_FIELDS[1],
        SEO_FIELDS[2],
        SEO_FIELDS[3],
        SEO_FIELDS[4],
        SEO_FIELDS[5],
        SEO_FIELDS[6],
        SEO_FIELDS[7],
    ],
    media: &[MediaSlot::image("blogs").required()],
    category: CategoryRule::Required,
    subcategory: false,
    slug: SlugRule::Required,
    display_order: false,
    public_submission: false,
    singleton: false,
};

static COURSES: EntityManifest = EntityManifest {
    kind: EntityKind::Courses,
    fields: &[
        FieldSpec::localized("title").required(),
        FieldSpec::localized("shortContent"),
        FieldSpec::localized("content"),
        FieldSpec::text("courseMode").or(FieldDefault::Text("offline")),
        FieldSpec::integer("lectures"),
        FieldSpec::text("duration"),
        FieldSpec::text("languages"),
        FieldSpec::number("originalPrice"),
        FieldSpec::number("price"),
        FieldSpec::number("totalFee"),
        FieldSpec::number("oneTimeFee"),
        FieldSpec::number("firstInstallment"),
        FieldSpec::number("secondInstallment"),
        FieldSpec::number("thirdInstallment"),
        FieldSpec::number("fourthInstallment"),
        FieldSpec::text("badge"),
        FieldSpec::text("badgeColor"),
        FieldSpec::list("features"),
        FieldSpec::text("demoVideo"),
        FieldSpec::list("videos"),
        SEO_FIELDS[0],
        SEO_FIELDS[1],
        SEO_FIELDS[2],
        SEO_FIELDS[3],
        SEO_FIELDS[4],
        SEO_FIELDS[5],
        SEO_FIELDS[6],
        SEO_FIELDS[7],
    ],
    media: &[MediaSlot::image("courses")],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::DerivedFrom("title"),
    display_order: true,
    public_submission: false,
    singleton: false,
};

static CURRENT_AFFAIRS: EntityManifest = EntityManifest {
    kind: EntityKind::CurrentAffairs,
    fields: &[
        FieldSpec::localized("title").required(),
        FieldSpec::localized("shortContent"),
        FieldSpec::localized("content"),
        FieldSpec::text("affairDate"),
    ],
    media: &[MediaSlot::image("current_affairs")],
    category: CategoryRule::Required,
    subcategory: true,
    slug: SlugRule::Required,
    display_order: false,
    public_submission: false,
    singleton: false,
};

static TESTIMONIALS: EntityManifest = EntityManifest {
    kind: EntityKind::Testimonials,
    fields: &[
        FieldSpec::localized("name").required(),
        FieldSpec::localized("quote"),
        FieldSpec::text("rank"),
        FieldSpec::text("year"),
        FieldSpec::text("attempts"),
        FieldSpec::text("optional"),
        FieldSpec::text("background"),
    ],
    media: &[MediaSlot::image("testimonials").required()],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::None,
    display_order: true,
    public_submission: false,
    singleton: false,
};

static RESULTS: EntityManifest = EntityManifest {
    kind: EntityKind::Results,
    fields: &[
        FieldSpec::localized("name").required(),
        FieldSpec::localized("rank"),
        FieldSpec::localized("service"),
        FieldSpec::localized("desc"),
        FieldSpec::text("year").required(),
        FieldSpec::text("btnName"),
        FieldSpec::text("btnLink"),
    ],
    media: &[MediaSlot::image("results").required()],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::None,
    display_order: true,
    public_submission: false,
    singleton: false,
};

static SLIDERS: EntityManifest = EntityManifest {
    kind: EntityKind::Sliders,
    fields: &[
        FieldSpec::localized("title"),
        FieldSpec::text("type")
            .or(FieldDefault::Text("Desktop"))
            .one_of(&["Desktop", "Mobile"]),
    ],
    media: &[MediaSlot::image("sliders").required()],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::None,
    display_order: true,
    public_submission: false,
    singleton: false,
};

static GALLERY: EntityManifest = EntityManifest {
    kind: EntityKind::Gallery,
    fields: &[FieldSpec::localized("title")],
    media: &[MediaSlot::image("gallery").required()],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::None,
    display_order: false,
    public_submission: false,
    singleton: false,
};

static ANNOUNCEMENTS: EntityManifest = EntityManifest {
    kind: EntityKind::Announcements,
    fields: &[
        FieldSpec::localized("title").required(),
        FieldSpec::text("bgcolor").or(FieldDefault::Text("bg-blue-500")),
    ],
    media: &[],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::None,
    display_order: true,
    public_submission: false,
    singleton: false,
};

static SCHOLARSHIPS: EntityManifest = EntityManifest {
    kind: EntityKind::Scholarships,
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::text("phone").required(),
        FieldSpec::text("email").required(),
        FieldSpec::text("course"),
        FieldSpec::text("message"),
    ],
    media: &[],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::None,
    display_order: false,
    public_submission: true,
    singleton: false,
};

static ELEARNINGS: EntityManifest = EntityManifest {
    kind: EntityKind::ELearnings,
    fields: &[
        FieldSpec::localized("title").required(),
        FieldSpec::text("monthYear").required(),
    ],
    media: &[
        MediaSlot::pdf("fileEN", "elearning/en").required(),
        MediaSlot::pdf("fileHI", "elearning/hi"),
    ],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::None,
    display_order: true,
    public_submission: false,
    singleton: false,
};

static SETTINGS: EntityManifest = EntityManifest {
    kind: EntityKind::Settings,
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::text("phone").required(),
        FieldSpec::text("whatsapp"),
        FieldSpec::text("email").required(),
        FieldSpec::text("address"),
        FieldSpec::text("googleMap"),
        FieldSpec::text("facebook"),
        FieldSpec::text("instagram"),
        FieldSpec::text("youtube"),
        FieldSpec::text("linkedin"),
        FieldSpec::text("twitter"),
        FieldSpec::text("telegram"),
    ],
    media: &[MediaSlot::image("web")],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::None,
    display_order: false,
    public_submission: false,
    singleton: true,
};

static RESULT_SECTION: EntityManifest = EntityManifest {
    kind: EntityKind::ResultSection,
    fields: &[
        FieldSpec::text("description").required(),
        FieldSpec::text("buttonText").or(FieldDefault::Text("View All Results")),
        FieldSpec::text("buttonLink").or(FieldDefault::Text("/results")),
    ],
    media: &[],
    category: CategoryRule::None,
    subcategory: false,
    slug: SlugRule::None,
    display_order: false,
    public_submission: false,
    singleton: true,
};
