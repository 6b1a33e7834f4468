/// User Administration Example
///
/// This example demonstrates:
/// - Loading users from JSON into a table controller
/// - Global search, column filters, sorting and paging
/// - Row selection and CSV export
/// - Editing and deleting rows through a host-side store
///
/// Run with `RUST_LOG=debug` to see the engine's log output.

use datatable::{
    dispatch, CellValue, ColumnSpec, DeleteConfirmation, EditSession, ExportOptions, FieldErrors, FilterValue,
    FilterVariant, MutationError, Row, RowId, RowMutationHandler, RowPatch, TableController, TableOptions,
};
use std::collections::BTreeMap;

const USERS: &str = r#"[
    {"id": 1, "name": "Alice Johnson", "email": "alice@example.com", "age": 34, "status": "single"},
    {"id": 2, "name": "Bob Smith", "email": "bob@example.com", "age": 27, "status": "complicated"},
    {"id": 3, "name": "Malika Ali", "email": "malika@example.org", "age": 41, "status": "relationship"},
    {"id": 4, "name": "Dan Brown", "email": "dan@example.com", "age": 19, "status": "single"},
    {"id": 5, "name": "Eve Adams", "email": "eve@example.net", "age": 52, "status": "relationship"}
]"#;

const MAX_FIELD_LEN: usize = 255;

/// Stand-in for the server: owns the users and validates every update.
struct UserStore {
    users: BTreeMap<RowId, BTreeMap<String, CellValue>>,
}

impl UserStore {
    fn from_rows(rows: &[&Row]) -> Self {
        let users = rows
            .iter()
            .map(|row| {
                let cells = row.cells().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                (row.id().clone(), cells)
            })
            .collect();
        UserStore { users }
    }

    fn rows(&self) -> Vec<Row> {
        self.users
            .iter()
            .map(|(id, cells)| {
                cells
                    .iter()
                    .fold(Row::new(id.clone()), |row, (k, v)| row.with(k.as_str(), v.clone()))
            })
            .collect()
    }

    fn validate(patch: &RowPatch) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in ["name", "email"] {
            match patch.get(field).map(|v| v.trim()) {
                None | Some("") => errors.insert(field, format!("The {} field is required.", field)),
                Some(v) if v.chars().count() > MAX_FIELD_LEN => errors.insert(
                    field,
                    format!("The {} field must not be greater than {} characters.", field, MAX_FIELD_LEN),
                ),
                Some(_) => {}
            }
        }
        errors
    }
}

impl RowMutationHandler for UserStore {
    fn update(&mut self, id: &RowId, patch: &RowPatch) -> Result<(), MutationError> {
        let errors = Self::validate(patch);
        if !errors.is_empty() {
            return Err(MutationError::Validation(errors));
        }
        let user = self.users.get_mut(id).ok_or_else(|| MutationError::NotFound(id.clone()))?;
        for (field, value) in patch {
            user.insert(field.clone(), CellValue::from(value.as_str()));
        }
        Ok(())
    }

    fn delete(&mut self, id: &RowId) -> Result<(), MutationError> {
        self.users
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MutationError::NotFound(id.clone()))
    }
}

fn columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::display("select").sortable(false).hideable(false),
        ColumnSpec::accessor("name").header("Name").filter_variant(FilterVariant::Fuzzy),
        ColumnSpec::accessor("email").header("Email"),
        ColumnSpec::accessor("age").header("Age").filter_variant(FilterVariant::Range),
        ColumnSpec::accessor("status").header("Status").filter_variant(FilterVariant::Select),
        ColumnSpec::display("actions").hideable(false),
    ]
}

fn print_page(title: &str, table: &TableController) {
    println!("{} (page {}/{}, {} of {} rows)", title, table.page_index() + 1, table.page_count(), table.filtered_row_count(), table.row_count());
    for row in table.page_rows() {
        let marker = if table.is_selected(row.id()) { "[x]" } else { "[ ]" };
        let cells: Vec<String> = table
            .visible_columns()
            .iter()
            .filter(|c| c.has_accessor())
            .map(|c| c.render(row))
            .collect();
        println!("   {} {}", marker, cells.join(" | "));
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== DataTable User Admin Example ===\n");

    let options = TableOptions::default()
        .with_page_size(3)
        .with_export(ExportOptions::default().with_filename("users"));
    let mut table = TableController::from_json(columns(), USERS, "id", options)?;
    let mut store = UserStore::from_rows(&table.filtered_rows());

    print_page("1. All users", &table);

    table.set_global_filter("ali");
    print_page("2. Global search \"ali\"", &table);
    table.set_global_filter("");

    table.set_column_filter("age", FilterValue::range(Some(25.0), Some(45.0)))?;
    table.toggle_sort("age", false)?;
    table.toggle_sort("age", false)?;
    print_page("3. Age 25..45, oldest first", &table);
    table.reset_column_filters();
    table.clear_sorting();

    table.toggle_sort("name", false)?;
    table.next_page();
    print_page("4. Sorted by name, second page", &table);

    table.first_page();
    table.toggle_all_on_page();
    println!("5. Selected {} rows on the first page", table.selected_count());
    let blob = table.export()?;
    println!("   {} ({}, {} bytes):\n{}", blob.filename, blob.mime_type, blob.len(), blob.as_str());
    table.clear_selection();

    println!("6. Editing Bob...");
    let bob = RowId::from(2);
    let mut session = match table.row_context(&bob) {
        Some(ctx) => EditSession::open(&ctx, &["name", "email"]),
        None => return Err("Bob is not in the current view".into()),
    };
    session.set_field("name", "");
    if let Err(err) = session.submit(&mut store) {
        println!("   rejected: {}", err);
        for (field, message) in session.errors().iter() {
            println!("   {}: {}", field, message);
        }
    }
    session.set_field("name", "Robert Smith");
    session.submit(&mut store)?;
    table.set_rows(store.rows())?;
    println!("   saved, dialog open: {}\n", session.is_open());

    println!("7. Deleting Dan...");
    if let Some(ctx) = table.row_context(&RowId::from(4)) {
        println!("   copied email: {}", ctx.copy_value("email"));
        let mut confirm = DeleteConfirmation::open(&ctx);
        confirm.confirm(&mut store)?;
    }
    table.set_rows(store.rows())?;

    // A stale request for a row that is already gone
    if let Err(err) = dispatch(&mut store, &datatable::RowMutation::Delete { id: RowId::from(4) }) {
        println!("   second delete: {}", err);
    }
    println!();

    print_page("8. After edits", &table);

    println!("=== Example completed successfully! ===");
    Ok(())
}
