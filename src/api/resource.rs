use crate::query::Tag;

/// Defines a table column for a resource list.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub field: &'static str,
    pub width: u16, // percentage of the table width
}

/// Input shape of a form field.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Multiline,
}

/// Defines a form field for create and edit modals.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn column(header: &'static str, field: &'static str, width: u16) -> Column {
    Column {
        header,
        field,
        width,
    }
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required,
    }
}

/// Specifying the entity categories managed by the dashboard.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Courses,
    Trainings,
    Tests,
    Certificates,
    Users,
    Companies,
    Employees,
    Orders,
    Contacts,
    Subscribers,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Courses,
        Resource::Trainings,
        Resource::Tests,
        Resource::Certificates,
        Resource::Users,
        Resource::Companies,
        Resource::Employees,
        Resource::Orders,
        Resource::Contacts,
        Resource::Subscribers,
    ];

    /// Path segment of the REST endpoint.
    ///
    pub fn endpoint(&self) -> &'static str {
        match self {
            Resource::Courses => "courses",
            Resource::Trainings => "trainings",
            Resource::Tests => "tests",
            Resource::Certificates => "certificates",
            Resource::Users => "users",
            Resource::Companies => "companies",
            Resource::Employees => "employees",
            Resource::Orders => "orders",
            Resource::Contacts => "contacts",
            Resource::Subscribers => "subscribers",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Resource::Courses => "Courses",
            Resource::Trainings => "Trainings",
            Resource::Tests => "Tests",
            Resource::Certificates => "Certificates",
            Resource::Users => "Users",
            Resource::Companies => "Companies",
            Resource::Employees => "Employees",
            Resource::Orders => "Orders",
            Resource::Contacts => "Contacts",
            Resource::Subscribers => "Subscribers",
        }
    }

    /// Singular noun used in dialogs and notifications.
    ///
    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Courses => "course",
            Resource::Trainings => "training",
            Resource::Tests => "test",
            Resource::Certificates => "certificate",
            Resource::Users => "user",
            Resource::Companies => "company",
            Resource::Employees => "employee",
            Resource::Orders => "order",
            Resource::Contacts => "contact",
            Resource::Subscribers => "subscriber",
        }
    }

    /// Tag attached to every list query of this resource.
    ///
    pub fn tag(&self) -> Tag {
        match self {
            Resource::Courses => Tag::Courses,
            Resource::Trainings => Tag::Trainings,
            Resource::Tests => Tag::Tests,
            Resource::Certificates => Tag::Certificates,
            Resource::Users => Tag::Users,
            Resource::Companies => Tag::Companies,
            Resource::Employees => Tag::Employees,
            Resource::Orders => Tag::Orders,
            Resource::Contacts => Tag::Contacts,
            Resource::Subscribers => Tag::Subscribers,
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            Resource::Courses => const { &[
                column("Title", "title", 40),
                column("Category", "category.name", 20),
                column("Price", "price", 15),
                column("Lessons", "lessonsCount", 10),
                column("Published", "published", 15),
            ] },
            Resource::Trainings => const { &[
                column("Title", "title", 40),
                column("Course", "course.title", 30),
                column("Starts", "startDate", 15),
                column("Seats", "seats", 15),
            ] },
            Resource::Tests => const { &[
                column("Title", "title", 45),
                column("Course", "course.title", 30),
                column("Questions", "questionsCount", 12),
                column("Pass %", "passScore", 13),
            ] },
            Resource::Certificates => const { &[
                column("Number", "number", 20),
                column("Holder", "user.name", 30),
                column("Test", "test.title", 30),
                column("Issued", "issuedAt", 20),
            ] },
            Resource::Users => const { &[
                column("Name", "name", 30),
                column("Email", "email", 35),
                column("Role", "role", 15),
                column("Active", "active", 20),
            ] },
            Resource::Companies => const { &[
                column("Name", "name", 40),
                column("Email", "email", 30),
                column("Phone", "phone", 15),
                column("Employees", "employeesCount", 15),
            ] },
            Resource::Employees => const { &[
                column("Name", "name", 30),
                column("Email", "email", 30),
                column("Position", "position", 20),
                column("Company", "company.name", 20),
            ] },
            Resource::Orders => const { &[
                column("Order", "number", 15),
                column("Customer", "user.name", 30),
                column("Course", "course.title", 30),
                column("Amount", "amount", 10),
                column("Status", "status", 15),
            ] },
            Resource::Contacts => const { &[
                column("Name", "name", 25),
                column("Email", "email", 25),
                column("Message", "message", 50),
            ] },
            Resource::Subscribers => const { &[
                column("Email", "email", 60),
                column("Subscribed", "createdAt", 40),
            ] },
        }
    }

    /// Fields of the create and edit form. Empty for resources the
    /// dashboard can only browse and delete.
    ///
    pub fn form_fields(&self) -> &'static [FieldSpec] {
        use FieldKind::*;
        match self {
            Resource::Courses => const { &[
                field("title", "Title", Text, true),
                field("description", "Description", Multiline, false),
                field("price", "Price", Number, true),
                field("categoryId", "Category ID", Text, false),
            ] },
            Resource::Trainings => const { &[
                field("title", "Title", Text, true),
                field("courseId", "Course ID", Text, true),
                field("startDate", "Start date (YYYY-MM-DD)", Text, true),
                field("seats", "Seats", Number, false),
            ] },
            Resource::Tests => const { &[
                field("title", "Title", Text, true),
                field("courseId", "Course ID", Text, true),
                field("passScore", "Pass score %", Number, true),
            ] },
            Resource::Users => const { &[
                field("name", "Name", Text, true),
                field("email", "Email", Email, true),
                field("role", "Role", Text, false),
            ] },
            Resource::Companies => const { &[
                field("name", "Name", Text, true),
                field("email", "Email", Email, true),
                field("phone", "Phone", Text, false),
            ] },
            Resource::Employees => const { &[
                field("name", "Name", Text, true),
                field("email", "Email", Email, true),
                field("position", "Position", Text, false),
                field("companyId", "Company ID", Text, true),
            ] },
            Resource::Certificates
            | Resource::Orders
            | Resource::Contacts
            | Resource::Subscribers => &[],
        }
    }

    /// Return true if records can be created and edited from the dashboard.
    ///
    pub fn is_editable(&self) -> bool {
        !self.form_fields().is_empty()
    }

    /// Child resource opened when a row is entered, if any.
    ///
    pub fn drill_down(&self) -> Option<Resource> {
        match self {
            Resource::Companies => Some(Resource::Employees),
            Resource::Courses => Some(Resource::Trainings),
            Resource::Tests => Some(Resource::Certificates),
            _ => None,
        }
    }

    /// Status values the list can be narrowed to.
    ///
    pub fn statuses(&self) -> &'static [&'static str] {
        match self {
            Resource::Orders => &["pending", "paid", "cancelled"],
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_widths_sum_to_100() {
        for resource in Resource::ALL {
            let total: u16 = resource.columns().iter().map(|c| c.width).sum();
            assert_eq!(total, 100, "{:?}", resource);
        }
    }

    #[test]
    fn test_every_resource_has_distinct_tag() {
        let mut tags: Vec<Tag> = Resource::ALL.iter().map(Resource::tag).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), Resource::ALL.len());
    }

    #[test]
    fn test_editable_resources() {
        assert!(Resource::Courses.is_editable());
        assert!(Resource::Employees.is_editable());
        assert!(!Resource::Orders.is_editable());
        assert!(!Resource::Subscribers.is_editable());
    }

    #[test]
    fn test_drill_down() {
        assert_eq!(Resource::Companies.drill_down(), Some(Resource::Employees));
        assert_eq!(Resource::Tests.drill_down(), Some(Resource::Certificates));
        assert_eq!(Resource::Courses.drill_down(), Some(Resource::Trainings));
        assert_eq!(Resource::Users.drill_down(), None);
    }
}
