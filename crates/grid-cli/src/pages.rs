//! Demo pages: the columns and data set of every table on every route.
//!
//! Data is deterministic so rendered output and exports are reproducible.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Days, NaiveDate};
use grid_model::{
    CellValue, ColumnDescriptor, ColumnId, FlatRecord, HierarchyPath, NestedRecord, PinSide,
    RowId,
};
use grid_table::{ExpansionState, TableConfig};

use crate::routes::Route;

/// One table of a page.
#[derive(Debug, Clone)]
pub struct PageTable {
    /// Storage key of the table's saved layout.
    pub key: &'static str,
    pub title: &'static str,
    pub config: TableConfig,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub route: Route,
    pub tables: Vec<PageTable>,
}

impl Page {
    pub fn title(&self) -> &'static str {
        self.route.title()
    }

    /// The table named `key`, or the first table when no key is given.
    pub fn table(&self, key: Option<&str>) -> Result<&PageTable> {
        match key {
            None => self
                .tables
                .first()
                .ok_or_else(|| anyhow!("page {} has no tables", self.route)),
            Some(key) => self.tables.iter().find(|t| t.key == key).ok_or_else(|| {
                let known: Vec<&str> = self.tables.iter().map(|t| t.key).collect();
                anyhow!(
                    "page {} has no table {key:?} (tables: {})",
                    self.route,
                    known.join(", ")
                )
            }),
        }
    }

    pub fn into_table(self, key: Option<&str>) -> Result<PageTable> {
        let index = match key {
            None => 0,
            Some(key) => self
                .tables
                .iter()
                .position(|t| t.key == key)
                .ok_or_else(|| anyhow!("page {} has no table {key:?}", self.route))?,
        };
        self.tables
            .into_iter()
            .nth(index)
            .ok_or_else(|| anyhow!("page has no tables"))
    }
}

pub fn build_page(route: Route) -> Result<Page> {
    let tables = match route {
        Route::Home => vec![project_breakdown()?],
        Route::MultiTable => vec![multi_table_wbs()?, multi_table_products()?],
        Route::Demo => vec![demo_table()?],
        Route::OneTable => vec![org_hierarchy()?],
        Route::Drag => vec![people()?],
        Route::EnhancedTable => vec![enhanced_wbs()?],
    };
    if tables.is_empty() {
        bail!("page {route} has no tables");
    }
    Ok(Page { route, tables })
}

fn column(id: &str, header: &str) -> Result<ColumnDescriptor> {
    Ok(ColumnDescriptor::new(ColumnId::new(id)?, header))
}

fn select_column() -> Result<ColumnDescriptor> {
    Ok(ColumnDescriptor::structural(ColumnId::new("select")?, "", 40))
}

fn actions_column() -> Result<ColumnDescriptor> {
    Ok(ColumnDescriptor::structural(ColumnId::new("actions")?, "Actions", 80))
}

fn row_id(value: impl Into<String>) -> Result<RowId> {
    Ok(RowId::new(value)?)
}

fn project_start() -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 1, 8).context("project start date")
}

/// `$25,000`; non-numeric values are shown as they are.
pub fn currency(value: &CellValue) -> String {
    match value {
        CellValue::Integer(amount) => {
            let sign = if *amount < 0 { "-" } else { "" };
            format!("{sign}${}", group_thousands(amount.unsigned_abs()))
        }
        CellValue::Number(amount) => format!("${amount:.2}"),
        other => other.to_string(),
    }
}

pub fn percent(value: &CellValue) -> String {
    match value {
        CellValue::Integer(_) | CellValue::Number(_) => format!("{value}%"),
        other => other.to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

struct Task {
    outline: &'static str,
    name: &'static str,
    kind: &'static str,
    status: &'static str,
    progress: i64,
    fee: i64,
    budget: i64,
    discipline: Option<&'static str>,
}

#[allow(clippy::too_many_arguments)]
const fn task(
    outline: &'static str,
    name: &'static str,
    kind: &'static str,
    status: &'static str,
    progress: i64,
    fee: i64,
    budget: i64,
    discipline: Option<&'static str>,
) -> Task {
    Task {
        outline,
        name,
        kind,
        status,
        progress,
        fee,
        budget,
        discipline,
    }
}

const TASKS: &[Task] = &[
    task("1", "Pre-Design", "phase", "Complete", 100, 25_000, 30_000, None),
    task("1.1", "Site Analysis", "stage", "Complete", 100, 8_500, 10_000, Some("Architecture")),
    task("1.1.1", "Survey Review", "task", "Complete", 100, 3_500, 4_000, None),
    task("1.1.2", "Environmental Assessment", "task", "Complete", 100, 5_000, 6_000, None),
    task("1.2", "Feasibility Study", "stage", "Complete", 100, 16_500, 20_000, Some("Architecture")),
    task("2", "Schematic Design", "phase", "Active", 65, 75_000, 100_000, None),
    task("2.1", "Concept Development", "stage", "Complete", 100, 25_000, 30_000, Some("Architecture")),
    task("2.1.1", "Initial Sketches", "task", "Complete", 100, 15_000, 18_000, None),
    task("2.1.2", "Client Review Meeting", "task", "Complete", 100, 2_500, 3_000, None),
    task("2.1.3", "Revisions", "task", "Complete", 100, 7_500, 9_000, None),
    task("2.2", "Preliminary Drawings", "stage", "Active", 50, 50_000, 70_000, Some("Architecture")),
    task("2.2.1", "Floor Plans", "task", "Active", 80, 20_000, 25_000, None),
    task("2.2.2", "Elevations", "task", "Pending", 30, 15_000, 20_000, None),
    task("2.2.3", "Sections", "task", "Pending", 10, 15_000, 25_000, None),
    task("3", "Design Development", "phase", "Pending", 0, 100_000, 150_000, None),
    task("3.1", "Technical Documentation", "stage", "Pending", 0, 60_000, 80_000, Some("MEP")),
    task("3.1.1", "HVAC Specification", "task", "Pending", 0, 20_000, 25_000, None),
    task("3.1.2", "Electrical Systems", "task", "Pending", 0, 15_000, 20_000, None),
    task("3.1.3", "Plumbing Documentation", "task", "Pending", 0, 25_000, 35_000, None),
    task("3.2", "Materials Selection", "stage", "Pending", 0, 40_000, 70_000, Some("Interior")),
    task("4", "Construction Documents", "phase", "Pending", 0, 50_000, 80_000, None),
];

const ASSIGNEES: [&str; 4] = ["Alex Johnson", "Sam Taylor", "Jordan Lee", "Morgan Smith"];
const HOURLY_RATE: i64 = 125;

impl Task {
    fn id(&self) -> Result<RowId> {
        row_id(format!("{}_{}", self.kind, self.outline))
    }

    fn parent_outline(&self) -> Option<&'static str> {
        self.outline.rsplit_once('.').map(|(parent, _)| parent)
    }

    /// Field values shared by every WBS page. Dates and assignees are spread
    /// by position so neighbouring rows differ.
    fn fields(&self, index: usize, start: NaiveDate) -> Vec<(&'static str, CellValue)> {
        let offset = index as u64 * 7;
        let begins = start + Days::new(offset);
        let ends = begins + Days::new(30 + (index as u64 % 4) * 15);
        let discipline = self.discipline.unwrap_or(if index % 2 == 0 {
            "Architecture"
        } else {
            "Structure"
        });
        let notes = if index % 4 == 3 {
            CellValue::text("Some notes here...")
        } else {
            CellValue::Missing
        };
        vec![
            ("wbs", CellValue::text(self.outline)),
            ("name", CellValue::text(self.name)),
            ("type", CellValue::text(self.kind)),
            ("status", CellValue::text(self.status)),
            ("startDate", begins.into()),
            ("endDate", ends.into()),
            ("discipline", CellValue::text(discipline)),
            ("progress", self.progress.into()),
            ("fee", self.fee.into()),
            ("budget", self.budget.into()),
            ("assignee", CellValue::text(ASSIGNEES[index % ASSIGNEES.len()])),
            ("notes", notes),
        ]
    }
}

fn flat_tasks(tasks: &[Task]) -> Result<Vec<FlatRecord>> {
    let start = project_start()?;
    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| -> Result<FlatRecord> {
            let path = HierarchyPath::from_outline(task.outline)?;
            let record = task
                .fields(index, start)
                .into_iter()
                .fold(FlatRecord::new(task.id()?, path), |record, (name, value)| {
                    record.with_field(name, value)
                });
            Ok(record)
        })
        .collect()
}

/// Nest tasks under their outline parents, keeping source order.
fn nested_tasks(
    tasks: &[Task],
    parent: Option<&str>,
    fields: &impl Fn(usize, &Task) -> Result<NestedRecord>,
) -> Result<Vec<NestedRecord>> {
    let mut records = Vec::new();
    for (index, task) in tasks.iter().enumerate() {
        if task.parent_outline() != parent {
            continue;
        }
        let mut record = fields(index, task)?;
        record.children = nested_tasks(tasks, Some(task.outline), fields)?;
        records.push(record);
    }
    Ok(records)
}

fn project_breakdown() -> Result<PageTable> {
    let start = project_start()?;
    let columns = vec![
        select_column()?,
        column("wbs", "WBS")?.with_width(80).with_pin(PinSide::Left),
        column("name", "Name")?.with_width(240),
        column("status", "Status")?.with_width(110),
        column("startDate", "Start Date")?.with_width(120),
        column("endDate", "End Date")?.with_width(120),
        column("assigned", "Assigned")?.with_field("assignee"),
        column("discipline", "Discipline")?.with_width(120),
        column("units", "Units")?.with_width(80),
        column("rate", "Rate")?.with_width(90).with_formatter(currency),
        column("budget", "Budget")?.with_width(110).with_formatter(currency),
        column("fee", "Fee")?.with_width(110).with_formatter(currency),
        column("used", "Used")?.with_width(110).with_formatter(currency),
        column("notes", "Notes")?.with_width(200),
        actions_column()?,
    ];
    let rows = nested_tasks(TASKS, None, &|index, task| {
        let mut record = NestedRecord::new(task.id()?);
        for (name, value) in task.fields(index, start) {
            record = record.with_field(name, value);
        }
        Ok(record
            .with_field("units", task.fee / HOURLY_RATE)
            .with_field("rate", HOURLY_RATE)
            .with_field("used", task.fee * task.progress / 100))
    })?;
    Ok(PageTable {
        key: "project-breakdown",
        title: "Project Breakdown",
        config: TableConfig::new(columns)
            .with_storage_key("project-breakdown")
            .with_nested_rows(rows),
    })
}

fn multi_table_wbs() -> Result<PageTable> {
    let columns = vec![
        column("wbs", "WBS")?.with_width(80),
        column("name", "Task")?.with_width(240),
        column("status", "Status")?.with_width(110),
        column("fee", "Fee")?.with_width(110).with_formatter(currency),
    ];
    Ok(PageTable {
        key: "multi-table-wbs",
        title: "Work Breakdown",
        config: TableConfig::new(columns)
            .with_storage_key("multi-table-wbs")
            .with_initial_expansion(ExpansionState::AllCollapsed)
            .with_flat_rows(flat_tasks(&TASKS[..5])?),
    })
}

struct Variant {
    format: &'static str,
    available: i64,
    cat: &'static str,
}

struct Product {
    slug: &'static str,
    title: &'static str,
    artist: &'static str,
    category: &'static str,
    label: &'static str,
    year: i64,
    status: &'static str,
    price: i64,
    sold: i64,
    variants: &'static [Variant],
}

const PRODUCTS: &[Product] = &[
    Product {
        slug: "rumours",
        title: "Rumours",
        artist: "Fleetwood Mac",
        category: "Soft Rock",
        label: "Warner Records",
        year: 1977,
        status: "active",
        price: 40,
        sold: 15,
        variants: &[
            Variant {
                format: "LP, Album, Picture Disc, Reissue",
                available: 4,
                cat: "RPD1 3010",
            },
            Variant {
                format: "Blu-Ray, Album, Reissue, Dolby Atmos",
                available: 6,
                cat: "BA2 3010",
            },
            Variant {
                format: "CD, Album, Reissue, Remastered",
                available: 2,
                cat: "R2 599763",
            },
        ],
    },
    Product {
        slug: "blue",
        title: "Blue",
        artist: "Joni Mitchell",
        category: "Folk",
        label: "Reprise Records",
        year: 1971,
        status: "active",
        price: 35,
        sold: 9,
        variants: &[
            Variant {
                format: "LP, Album, Reissue",
                available: 5,
                cat: "MS 2038",
            },
            Variant {
                format: "CD, Album, Remastered",
                available: 3,
                cat: "2038-2",
            },
        ],
    },
    Product {
        slug: "kind-of-blue",
        title: "Kind of Blue",
        artist: "Miles Davis",
        category: "Jazz",
        label: "Columbia",
        year: 1959,
        status: "archived",
        price: 30,
        sold: 21,
        variants: &[],
    },
];

fn multi_table_products() -> Result<PageTable> {
    let columns = vec![
        column("product", "Product")?.with_width(180),
        column("artist", "Artist")?,
        column("format", "Format")?.with_width(260),
        column("label", "Label")?,
        column("cat", "Cat#")?.with_width(110),
        column("country", "Country")?.with_width(110),
        column("year", "Year")?.with_width(70),
        column("available", "Available")?.with_width(90),
        column("price", "Price")?.with_width(80).with_formatter(currency),
        column("sold", "Sold")?.with_width(70),
    ];
    let rows = PRODUCTS
        .iter()
        .map(|product| -> Result<NestedRecord> {
            let mut record = NestedRecord::new(row_id(format!("product_{}", product.slug))?)
                .with_field("product", product.title)
                .with_field("artist", product.artist)
                .with_field("category", product.category)
                .with_field("year", product.year)
                .with_field("status", product.status)
                .with_field(
                    "available",
                    product.variants.iter().map(|v| v.available).sum::<i64>(),
                )
                .with_field("price", product.price)
                .with_field("sold", product.sold);
            for (n, variant) in product.variants.iter().enumerate() {
                record = record.with_child(
                    NestedRecord::new(row_id(format!("variant_{}-{}", product.slug, n + 1))?)
                        .with_field("product", product.title)
                        .with_field("format", variant.format)
                        .with_field("label", product.label)
                        .with_field("cat", variant.cat)
                        .with_field("country", "Worldwide")
                        .with_field("year", 2024_i64)
                        .with_field("available", variant.available),
                );
            }
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PageTable {
        key: "multi-table-products",
        title: "Products",
        config: TableConfig::new(columns)
            .with_storage_key("multi-table-products")
            .with_initial_expansion(ExpansionState::AllCollapsed)
            .with_nested_rows(rows),
    })
}

fn demo_table() -> Result<PageTable> {
    let start = project_start()?;
    let columns = vec![
        column("wbs", "WBS")?.with_width(80),
        column("name", "Name")?.with_width(240),
        column("status", "Status")?.with_width(110),
        column("progress", "Progress")?.with_width(100).with_formatter(percent),
        column("fee", "Fee")?.with_width(110).with_formatter(currency),
        column("assignee", "Assignee")?,
        actions_column()?,
    ];
    let rows = nested_tasks(&TASKS[..14], None, &|index, task| {
        let mut record = NestedRecord::new(task.id()?);
        for (name, value) in task.fields(index, start) {
            record = record.with_field(name, value);
        }
        Ok(record)
    })?;
    Ok(PageTable {
        key: "demo",
        title: "Tasks",
        config: TableConfig::new(columns)
            .with_storage_key("demo")
            .with_nested_rows(rows),
    })
}

fn org_hierarchy() -> Result<PageTable> {
    let columns = vec![
        column("wbs", "WBS")?.with_width(90).with_pin(PinSide::Left),
        column("name", "Name")?.with_width(200),
        column("status", "Status")?.with_width(120),
    ];
    // Two tasks share the outline 1.1.1; both hang off stage 1.
    let entries = [
        ("org_1", "1", "Phase 1", ""),
        ("org_2", "1.1", "stage 1", "Active"),
        ("org_3", "1.1.1", "task 1", "Completed"),
        ("org_4", "1.1.1", "task 2", "Pending"),
        ("org_5", "2", "Phase 2", ""),
        ("org_6", "2.1", "stage 2", "Pending"),
    ];
    let rows = entries
        .into_iter()
        .map(|(id, outline, name, status)| -> Result<FlatRecord> {
            Ok(
                FlatRecord::new(row_id(id)?, HierarchyPath::from_outline(outline)?)
                    .with_field("wbs", outline)
                    .with_field("name", name)
                    .with_field("status", status),
            )
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PageTable {
        key: "onetable",
        title: "Organization",
        config: TableConfig::new(columns)
            .with_storage_key("onetable")
            .with_flat_rows(rows),
    })
}

const FIRST_NAMES: [&str; 5] = ["Tanner", "Tandy", "Joe", "Kevin", "Ana"];
const LAST_NAMES: [&str; 5] = ["Linsley", "Miller", "Dirte", "Vandy", "Ortiz"];
const PERSON_STATUSES: [&str; 3] = ["relationship", "complicated", "single"];

fn people() -> Result<PageTable> {
    let columns = vec![
        column("firstName", "First Name")?,
        column("lastName", "Last Name")?,
        column("age", "Age")?.with_width(70),
        column("visits", "Visits")?.with_width(80),
        column("status", "Status")?.with_width(130),
        column("progress", "Profile Progress")?
            .with_width(150)
            .with_formatter(percent),
    ];
    let rows = (0..20_usize)
        .map(|n| -> Result<NestedRecord> {
            Ok(NestedRecord::new(row_id(format!("person_{}", n + 1))?)
                .with_field("firstName", FIRST_NAMES[n % FIRST_NAMES.len()])
                .with_field("lastName", LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()])
                .with_field("age", 18 + (n as i64 * 7) % 50)
                .with_field("visits", (n as i64 * 131) % 1000)
                .with_field("status", PERSON_STATUSES[n % PERSON_STATUSES.len()])
                .with_field("progress", (n as i64 * 37) % 101))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PageTable {
        key: "drag",
        title: "People",
        config: TableConfig::new(columns)
            .with_storage_key("drag")
            .with_nested_rows(rows),
    })
}

fn enhanced_wbs() -> Result<PageTable> {
    let columns = vec![
        select_column()?,
        column("wbs", "WBS")?.with_width(80).with_pin(PinSide::Left),
        column("name", "Task Name")?.with_width(260),
        column("status", "Status")?.with_width(110),
        column("startDate", "Start Date")?.with_width(120),
        column("endDate", "End Date")?.with_width(120),
        column("discipline", "Discipline")?.with_width(120),
        column("progress", "Progress")?.with_width(100).with_formatter(percent),
        column("fee", "Fee")?.with_width(110).with_formatter(currency),
        column("budget", "Budget")?.with_width(110).with_formatter(currency),
        column("assignee", "Assignee")?,
        column("notes", "Notes")?.with_width(200).with_sortable(false),
        actions_column()?.with_pin(PinSide::Right),
    ];
    Ok(PageTable {
        key: "enhanced-table",
        title: "Project Tasks",
        config: TableConfig::new(columns)
            .with_storage_key("enhanced-table")
            .with_initial_expansion(ExpansionState::AllExpanded)
            .with_flat_rows(flat_tasks(TASKS)?),
    })
}

#[cfg(test)]
mod tests {
    use grid_table::TableState;

    use super::*;

    #[test]
    fn every_route_builds_clean_tables() {
        for route in Route::ALL {
            let page = build_page(route).unwrap();
            assert!(!page.tables.is_empty(), "{route}");
            for table in &page.tables {
                let state = TableState::new(table.config.clone());
                assert!(!state.tree().is_empty(), "{route} {}", table.key);
                assert!(state.build_report().is_clean(), "{route} {}", table.key);
                assert_eq!(state.storage_key(), Some(table.key));
            }
        }
    }

    #[test]
    fn enhanced_table_numbers_tasks() {
        let page = build_page(Route::EnhancedTable).unwrap();
        let state = TableState::new(page.tables[0].config.clone());
        let roots: Vec<&str> = state.tree().roots().iter().map(RowId::as_str).collect();
        assert_eq!(roots, ["phase_1", "phase_2", "phase_3", "phase_4"]);
        let stage = state.tree().get(&RowId::new("stage_2.2").unwrap()).unwrap();
        assert_eq!(stage.children.len(), 3);
        assert_eq!(stage.depth, 1);
    }

    #[test]
    fn org_hierarchy_keeps_shared_outline() {
        let page = build_page(Route::OneTable).unwrap();
        let state = TableState::new(page.tables[0].config.clone());
        let stage = state.tree().get(&RowId::new("org_2").unwrap()).unwrap();
        assert_eq!(stage.children.len(), 2);
    }

    #[test]
    fn multi_table_has_two_tables() {
        let page = build_page(Route::MultiTable).unwrap();
        assert_eq!(page.table(Some("multi-table-products")).unwrap().title, "Products");
        assert!(page.table(Some("missing")).is_err());
        assert_eq!(page.table(None).unwrap().key, "multi-table-wbs");
    }

    #[test]
    fn formats_money_and_percentages() {
        assert_eq!(currency(&CellValue::Integer(125_000)), "$125,000");
        assert_eq!(currency(&CellValue::Integer(-900)), "-$900");
        assert_eq!(currency(&CellValue::Number(12.5)), "$12.50");
        assert_eq!(currency(&CellValue::Missing), "");
        assert_eq!(percent(&CellValue::Integer(65)), "65%");
        assert_eq!(group_thousands(1_000_000), "1,000,000");
        assert_eq!(group_thousands(999), "999");
    }
}
