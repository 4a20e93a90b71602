//! Cache invalidation tags.

use std::fmt;

/// Entity categories used to associate cached queries with the mutations
/// that make them stale. Tags carry no meaning beyond equality.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Courses,
    Users,
    Companies,
    Employees,
    Tests,
    Certificates,
    Orders,
    Contacts,
    Subscribers,
    Trainings,
}

impl Tag {
    pub const ALL: [Tag; 10] = [
        Tag::Courses,
        Tag::Users,
        Tag::Companies,
        Tag::Employees,
        Tag::Tests,
        Tag::Certificates,
        Tag::Orders,
        Tag::Contacts,
        Tag::Subscribers,
        Tag::Trainings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Courses => "courses",
            Tag::Users => "users",
            Tag::Companies => "companies",
            Tag::Employees => "employees",
            Tag::Tests => "tests",
            Tag::Certificates => "certificates",
            Tag::Orders => "orders",
            Tag::Contacts => "contacts",
            Tag::Subscribers => "subscribers",
            Tag::Trainings => "trainings",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tag_names_are_unique() {
        let names: HashSet<&str> = Tag::ALL.iter().map(Tag::as_str).collect();
        assert_eq!(names.len(), Tag::ALL.len());
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::Courses.to_string(), "courses");
        assert_eq!(Tag::Subscribers.to_string(), "subscribers");
    }
}
