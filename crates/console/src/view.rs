//! Text rendering of the admin page: header, create form, product grid
//! and notification. Pure string builders over controller state.

use std::fmt::Write as _;

use almirah_core::image_intake::ImageStatus;
use almirah_core::notification::{Notification, Severity};
use almirah_core::product::Field;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tokio::time::Instant;

use crate::catalog::CatalogApi;
use crate::controller::AdminController;

/// Fields rendered as plain text inputs, in form order.
const TEXT_FIELDS: [Field; 4] = [
    Field::Name,
    Field::Description,
    Field::Price,
    Field::DiscountPrice,
];

const GRID_HEADER: [&str; 5] = ["ID", "Name", "Brand / Category", "Price", "Image"];

/// Everything on the page.
pub fn screen<A: CatalogApi>(controller: &AdminController<A>, now: Instant) -> String {
    let mut out = header(controller.products().len());
    out.push('\n');
    out.push_str(&form(controller));
    out.push('\n');
    out.push_str(&grid(controller));
    if let Some(toast) = controller.toast(now) {
        out.push('\n');
        out.push_str(&toast_line(toast));
    }
    out.push('\n');
    out
}

pub fn header(count: usize) -> String {
    let noun = if count == 1 { "product" } else { "products" };
    format!("== Almirah Admin ({count} {noun}) ==\n")
}

/// The create form with current values and field errors.
pub fn form<A: CatalogApi>(controller: &AdminController<A>) -> String {
    let draft = controller.draft();
    let errors = controller.errors();
    let mut out = String::from("Add New Product\n");

    for field in TEXT_FIELDS {
        let value = draft.get(field).unwrap_or_default();
        let _ = writeln!(out, "  {}{}: {value}", field.label(), required_mark(field));
        push_error(&mut out, errors.get(field));
    }

    let image = controller.image();
    let slot = match (image.status(), image.file()) {
        (ImageStatus::PreviewPending, Some(file)) => {
            format!("{} (preview loading...)", file.file_name())
        }
        (ImageStatus::PreviewReady, Some(file)) => {
            format!("{} ({} bytes, preview ready)", file.file_name(), file.size())
        }
        _ if image.is_dragging() => "[ drop the image here ]".to_string(),
        _ => "none (image <path> or drop <path>; PNG, JPG, GIF up to 5MB)".to_string(),
    };
    let _ = writeln!(out, "  {}*: {slot}", Field::Image.label());
    push_error(&mut out, errors.get(Field::Image));

    let _ = writeln!(out, "  {}*: {}", Field::Category.label(), draft.category);
    let _ = writeln!(out, "  {}*: {}", Field::Brand.label(), draft.brand);
    push_error(&mut out, errors.get(Field::Brand));

    if controller.is_submitting() {
        out.push_str("  [ Submitting... ]\n");
    } else {
        out.push_str("  [ Add Product ]\n");
    }
    out
}

/// The product grid, or its loading / empty state.
pub fn grid<A: CatalogApi>(controller: &AdminController<A>) -> String {
    let products = controller.products();
    let mut out = match controller.filter() {
        Some(category) => format!("Products ({}, {category} only)\n", products.len()),
        None => format!("Products ({})\n", products.len()),
    };

    if products.is_empty() {
        if controller.is_loading() {
            out.push_str("  Loading products...\n");
        } else {
            out.push_str("  No products yet\n  Add your first product using the form\n");
        }
        return out;
    }

    let mut builder = Builder::default();
    builder.push_record(GRID_HEADER.map(String::from));
    for p in products {
        builder.push_record([
            p.id.to_string(),
            p.name.clone(),
            format!("{} / {}", p.brand, p.category),
            p.price_display().to_string(),
            controller.image_src(p),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..4), Alignment::right());
    out.push_str(&table.to_string());
    out.push('\n');

    if let Some(id) = controller.pending_delete() {
        let _ = writeln!(
            out,
            "Are you sure you want to delete product {id}? (yes/no)"
        );
    }
    out
}

pub fn toast_line(toast: &Notification) -> String {
    let tag = match toast.severity {
        Severity::Success => "ok",
        Severity::Error => "error",
    };
    format!("[{tag}] {} (dismiss to close)", toast.message)
}

fn required_mark(field: Field) -> &'static str {
    match field {
        Field::Description | Field::DiscountPrice => "",
        _ => "*",
    }
}

fn push_error(out: &mut String, error: Option<&str>) {
    if let Some(message) = error {
        let _ = writeln!(out, "      ! {message}");
    }
}
