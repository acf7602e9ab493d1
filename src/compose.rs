// Page-by-page layout of the analysis report.
//
// Phases run in a fixed order, each advancing the canvas cursor and breaking
// pages before any block that would cross the bottom threshold. All chart
// math is delegated to `geometry`; this module only positions things.

use chrono::Local;

use crate::canvas::{Align, Canvas, Rgb, TextStyle};
use crate::fonts::Font;
use crate::geometry;
use crate::types::{IncidentRecord, ReportData};
use crate::util;

const INK: Rgb = Rgb::from_hex(0x121212);
const ACCENT: Rgb = Rgb::from_hex(0xD50000);
const WHITE: Rgb = Rgb::from_hex(0xFFFFFF);
const LABEL: Rgb = Rgb::from_hex(0x333333);
const VALUE: Rgb = Rgb::from_hex(0x555555);
const MUTED: Rgb = Rgb::from_hex(0x666666);
const BAR_LABEL: Rgb = Rgb::from_hex(0x444444);
const CARD_FILL: Rgb = Rgb::from_hex(0xF9F9F9);
const CARD_EDGE: Rgb = Rgb::from_hex(0xE0E0E0);
const BAR_TRACK: Rgb = Rgb::from_hex(0xEEEEEE);
const ZEBRA: Rgb = Rgb::from_hex(0xF9F9F9);
const HEADER_FILL: Rgb = Rgb::from_hex(0xE0E0E0);
const BLACK: Rgb = Rgb::from_hex(0x000000);

/// Slice/legend colors, cycled by category index.
const PIE_PALETTE: [Rgb; 6] = [
    Rgb::from_hex(0xD50000),
    Rgb::from_hex(0xFF1744),
    Rgb::from_hex(0xFF5252),
    Rgb::from_hex(0xFF8A80),
    Rgb::from_hex(0xB00020),
    Rgb::from_hex(0x333333),
];

const BANNER_H: f32 = 120.0;
const SUMMARY_STEP: f32 = 25.0;
const KPI_W: f32 = 240.0;
const KPI_H: f32 = 70.0;
const BAR_X: f32 = 120.0;
const BAR_TRACK_W: f32 = 350.0;
const BAR_H: f32 = 20.0;
const BAR_STEP: f32 = 35.0;
const PIE_CX: f32 = 200.0;
const PIE_CY: f32 = 200.0;
const PIE_R: f32 = 100.0;
const MAX_PIE_SLICES: usize = 6;
const LEGEND_X: f32 = 350.0;
const LEGEND_Y0: f32 = 150.0;
const LEGEND_STEP: f32 = 25.0;
const TABLE_X: f32 = 50.0;
const TABLE_W: f32 = 500.0;
const ROW_H: f32 = 20.0;
const HEADER_ROW_H: f32 = 25.0;
const TABLE_ROW_CAP: usize = 100;
/// Minimum space the table heading needs; otherwise it moves to a new page.
const HEADING_GUARD: f32 = 120.0;

/// What was laid out, for logging and for pagination assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeSummary {
    pub pages: usize,
    pub table_rows: usize,
    pub table_pages: usize,
    pub header_draws: usize,
}

/// Draw the full report onto `canvas`. `logo` is the resource name of an
/// already registered image XObject, or `None` when no logo is available.
pub fn compose(
    data: &ReportData,
    records: &[IncidentRecord],
    canvas: &mut Canvas,
    logo: Option<&str>,
) -> ComposeSummary {
    draw_banner(canvas, logo);
    draw_summary(canvas, data);
    draw_kpis(canvas, data);
    draw_bar_chart(canvas, data);
    draw_pie_chart(canvas, data);
    let table = draw_detail_table(canvas, records);
    ComposeSummary {
        pages: canvas.page_count(),
        table_rows: table.rows,
        table_pages: table.pages,
        header_draws: table.header_draws,
    }
}

fn draw_banner(canvas: &mut Canvas, logo: Option<&str>) {
    let width = canvas.metrics().width;
    canvas.rect(0.0, 0.0, width, BANNER_H, INK);

    if let Some(resource) = logo {
        let mut scope = canvas.save();
        scope.clip_circle(90.0, 60.0, 40.0);
        scope.image(resource, 50.0, 20.0, 80.0, 80.0);
    }

    canvas.text(
        "ROUTEWATCH",
        160.0,
        40.0,
        &TextStyle::new(Font::HelveticaBold, 28.0, ACCENT).char_spacing(2.0),
    );
    canvas.text(
        "BUS ROUTE ENFORCEMENT ANALYSIS",
        160.0,
        75.0,
        &TextStyle::new(Font::Helvetica, 10.0, WHITE).char_spacing(1.5),
    );

    let now = Local::now();
    let right = TextStyle::new(Font::Helvetica, 10.0, WHITE)
        .width(95.0)
        .align(Align::Right);
    canvas.text(
        &format!("Generated: {}", now.format("%Y-%m-%d")),
        450.0,
        50.0,
        &right,
    );
    canvas.text(&format!("Time: {}", now.format("%H:%M:%S")), 450.0, 65.0, &right);

    canvas.set_cursor_y(BANNER_H + 40.0);
}

fn draw_summary(canvas: &mut Canvas, data: &ReportData) {
    canvas.text(
        "Executive Summary",
        50.0,
        canvas.cursor_y(),
        &TextStyle::new(Font::HelveticaBold, 20.0, INK).underline(),
    );
    canvas.move_down(35.0);

    let top_route = data
        .top_routes
        .first()
        .map(|r| format!("Route {}", r.route))
        .unwrap_or_else(|| "N/A".to_string());
    let top_offense = data
        .top_offenses
        .first()
        .map(|o| o.offense.clone())
        .unwrap_or_else(|| "N/A".to_string());
    let items = [
        (
            "Total Recorded Incidents:",
            util::format_count(data.total_incidents),
        ),
        (
            "Total Revenue from Fines:",
            format!("LKR {}", util::format_amount(data.total_fines)),
        ),
        ("Most Critical Route:", top_route),
        ("Top Recurring Offense:", top_offense),
    ];

    let label_style = TextStyle::new(Font::HelveticaBold, 12.0, LABEL);
    let value_style = TextStyle::new(Font::Helvetica, 12.0, VALUE);
    for (label, value) in items {
        let y = canvas.cursor_y();
        canvas.rect(50.0, y + 2.0, 4.0, 4.0, ACCENT);
        canvas.text(label, 65.0, y, &label_style);
        canvas.text(&value, 230.0, y, &value_style);
        canvas.move_down(SUMMARY_STEP);
    }
    canvas.move_down(20.0);
}

fn draw_kpis(canvas: &mut Canvas, data: &ReportData) {
    let top = canvas.cursor_y();
    let value_style = TextStyle::new(Font::HelveticaBold, 24.0, ACCENT)
        .width(KPI_W)
        .align(Align::Center);
    let caption_style = TextStyle::new(Font::Helvetica, 10.0, MUTED)
        .width(KPI_W)
        .align(Align::Center);

    canvas.rounded_rect(50.0, top, KPI_W, KPI_H, 5.0, CARD_FILL, Some(CARD_EDGE));
    canvas.text(
        &util::format_count(data.total_incidents),
        50.0,
        top + 15.0,
        &value_style,
    );
    canvas.text("Total Recorded Incidents", 50.0, top + 45.0, &caption_style);

    canvas.rounded_rect(305.0, top, KPI_W, KPI_H, 5.0, CARD_FILL, Some(CARD_EDGE));
    canvas.text(
        &format!("LKR {}", util::format_amount(data.total_fines)),
        305.0,
        top + 15.0,
        &value_style,
    );
    canvas.text("Total Revenue from Fines", 305.0, top + 45.0, &caption_style);

    canvas.set_cursor_y(top + KPI_H + 30.0);
}

fn draw_bar_chart(canvas: &mut Canvas, data: &ReportData) {
    canvas.text(
        "Top 5 High-Risk Routes",
        50.0,
        canvas.cursor_y(),
        &TextStyle::new(Font::HelveticaBold, 16.0, INK),
    );
    canvas.move_down(25.0);

    let max_count = data.top_routes.first().map(|r| r.count).unwrap_or(0);
    let label_style = TextStyle::new(Font::Helvetica, 11.0, BAR_LABEL)
        .width(60.0)
        .align(Align::Right);
    let value_style = TextStyle::new(Font::HelveticaBold, 10.0, WHITE);

    for stat in &data.top_routes {
        let y = canvas.cursor_y();
        canvas.text(&format!("Route {}", stat.route), 50.0, y + 5.0, &label_style);
        canvas.rounded_rect(BAR_X, y, BAR_TRACK_W, BAR_H, 3.0, BAR_TRACK, None);
        let w = geometry::bar_width(stat.count, max_count, BAR_TRACK_W);
        if w > 0.0 {
            canvas.rounded_rect(BAR_X, y, w, BAR_H, 3.0, ACCENT, None);
        }
        canvas.text(&stat.count.to_string(), BAR_X + 5.0, y + 5.0, &value_style);
        canvas.move_down(BAR_STEP);
    }
}

fn draw_pie_chart(canvas: &mut Canvas, data: &ReportData) {
    canvas.add_page();
    let width = canvas.metrics().width;
    canvas.rect(0.0, 0.0, width, 50.0, INK);
    canvas.text(
        "Offense Distribution Analysis",
        50.0,
        18.0,
        &TextStyle::new(Font::Helvetica, 14.0, WHITE),
    );

    // Fractions are shares of the whole dataset, so with more than
    // MAX_PIE_SLICES categories the drawn wedges cover less than a full
    // turn and the remainder stays blank.
    let total = data.total_offense_count();
    let counts: Vec<u64> = data
        .top_offenses
        .iter()
        .take(MAX_PIE_SLICES)
        .map(|o| o.count)
        .collect();
    let slices = geometry::pie_slices(&counts, total);

    let legend_style = TextStyle::new(Font::Helvetica, 10.0, LABEL)
        .width(170.0)
        .ellipsis();
    let mut legend_y = LEGEND_Y0;
    for (i, stat) in data.top_offenses.iter().take(MAX_PIE_SLICES).enumerate() {
        let color = PIE_PALETTE[i % PIE_PALETTE.len()];
        let percent = match slices.get(i) {
            Some(slice) => {
                canvas.wedge(PIE_CX, PIE_CY, PIE_R, slice.start, slice.end, color);
                slice.percent()
            }
            // Zero offense total: no wedges, the legend still lists 0%.
            None => 0,
        };
        canvas.rect(LEGEND_X, legend_y, 15.0, 15.0, color);
        canvas.text(
            &format!("{} ({}%)", stat.offense, percent),
            LEGEND_X + 25.0,
            legend_y + 3.0,
            &legend_style,
        );
        legend_y += LEGEND_STEP;
    }

    canvas.set_cursor_y((PIE_CY + PIE_R).max(legend_y) + 180.0);
}

struct TableLayout {
    rows: usize,
    pages: usize,
    header_draws: usize,
}

fn draw_detail_table(canvas: &mut Canvas, records: &[IncidentRecord]) -> TableLayout {
    if !canvas.will_fit(HEADING_GUARD) {
        canvas.add_page();
    }
    canvas.text(
        "Detailed Incident Log",
        TABLE_X,
        canvas.cursor_y(),
        &TextStyle::new(Font::HelveticaBold, 18.0, INK),
    );
    canvas.move_down(30.0);

    draw_table_header(canvas);
    let mut header_draws = 1usize;
    let first_page = canvas.page_index();

    let cell = TextStyle::new(Font::Helvetica, 10.0, LABEL);
    let mut rows = 0usize;
    for (i, row) in records.iter().take(TABLE_ROW_CAP).enumerate() {
        // A row never splits: break first, then place it whole.
        if !canvas.will_fit(ROW_H) {
            canvas.add_page();
            draw_table_header(canvas);
            header_draws += 1;
        }
        let y = canvas.cursor_y();
        // Banding parity follows the rendered sequence, not the page.
        if i % 2 == 0 {
            canvas.rect(TABLE_X, y - 5.0, TABLE_W, ROW_H, ZEBRA);
        }
        canvas.text(&row.bus_no, 60.0, y, &cell.width(70.0).ellipsis());
        canvas.text(&row.route_id, 140.0, y, &cell.width(60.0).ellipsis());
        canvas.text(&row.start_time, 200.0, y, &cell.width(100.0).ellipsis());
        canvas.text(&row.offense, 310.0, y, &cell.width(160.0).ellipsis());
        canvas.text(&row.fine_display, 480.0, y, &cell);
        canvas.move_down(ROW_H);
        rows += 1;
    }

    TableLayout {
        rows,
        pages: canvas.page_index() - first_page + 1,
        header_draws,
    }
}

fn draw_table_header(canvas: &mut Canvas) {
    let y = canvas.cursor_y();
    canvas.rect(TABLE_X, y, TABLE_W, HEADER_ROW_H, HEADER_FILL);
    let style = TextStyle::new(Font::HelveticaBold, 10.0, BLACK);
    canvas.text("Bus No.", 60.0, y + 8.0, &style);
    canvas.text("Route", 140.0, y + 8.0, &style);
    canvas.text("Start Time", 200.0, y + 8.0, &style);
    canvas.text("Offense", 310.0, y + 8.0, &style);
    canvas.text("Fine (LKR)", 480.0, y + 8.0, &style);
    canvas.move_down(HEADER_ROW_H + 5.0);
}
