//! Server-side HTML for the weather page.

use super::models::{DailyView, HourlyView, WeatherPage, Widget};

const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// Render the full page document
pub fn render_page(page: &WeatherPage) -> String {
    let view = &page.view;
    let current = &view.current;

    let mut html = String::with_capacity(8 * 1024);
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    html.push_str(&format!(
        "<title>Clima - {}</title>\n</head>\n<body>\n",
        escape(&view.city_data.city)
    ));

    html.push_str(
        "<form method=\"post\" action=\"/\" class=\"search\">\n\
         <input type=\"text\" name=\"city_name\" placeholder=\"Buscar cidade\" autocomplete=\"off\">\n\
         <button type=\"submit\">Buscar</button>\n</form>\n",
    );

    html.push_str(&format!(
        "<section class=\"current\">\n<h1 class=\"city\">{}</h1>\n\
         <p class=\"updated\">Atualizado às {}</p>\n\
         <i class=\"icon icon-{}\"></i>\n\
         <p class=\"temp\">{}°C</p>\n\
         <p class=\"condition\">{}</p>\n</section>\n",
        escape(&view.city_data.city),
        escape(&view.city_data.last_updated),
        escape(&current.icon),
        current.temp,
        escape(&current.condition),
    ));

    html.push_str("<section class=\"hourly\">\n<canvas id=\"graficoHorario\"></canvas>\n<ul>\n");
    for hour in &view.hourly_forecast {
        html.push_str(&hourly_item(hour));
    }
    html.push_str("</ul>\n</section>\n");

    html.push_str("<section class=\"weekly\">\n<ul>\n");
    for day in &view.weekly_forecast {
        html.push_str(&daily_item(day));
    }
    html.push_str("</ul>\n</section>\n");

    html.push_str("<section class=\"widgets\">\n");
    for widget in &view.bottom_widgets {
        html.push_str(&widget_tile(widget));
    }
    html.push_str("</section>\n");

    html.push_str(&chart_script(page));
    html.push_str("</body>\n</html>\n");
    html
}

fn hourly_item(hour: &HourlyView) -> String {
    format!(
        "<li><span class=\"time\">{}</span><i class=\"icon icon-{}\" title=\"{}\"></i>\
         <span class=\"temp\">{}°</span></li>\n",
        escape(&hour.time),
        escape(&hour.icon),
        escape(&hour.condition),
        hour.temp
    )
}

fn daily_item(day: &DailyView) -> String {
    format!(
        "<li><span class=\"day\">{}</span><i class=\"icon icon-{}\" title=\"{}\"></i>\
         <span class=\"max\">{}°</span><span class=\"min\">{}°</span>\
         <span class=\"uv\">UV {}</span><span class=\"rain\">{}%</span></li>\n",
        escape(&day.day),
        escape(&day.icon),
        escape(&day.condition),
        day.max_temp,
        day.min_temp,
        day.uv_index_max,
        day.precipitation_probability
    )
}

fn widget_tile(widget: &Widget) -> String {
    format!(
        "<div class=\"widget\"><i class=\"icon icon-{}\"></i>\
         <span class=\"label\">{}</span><span class=\"value\">{}</span></div>\n",
        escape(&widget.icon),
        escape(&widget.label),
        escape(&widget.value)
    )
}

fn chart_script(page: &WeatherPage) -> String {
    // JSON arrays are valid JS literals; `<` is escaped so nothing can close the script tag
    let temps = script_json(&page.chart_temps);
    let times = script_json(&page.chart_times);

    format!(
        "<script>\nconst CHART_TEMPS = {temps};\nconst CHART_TIMES = {times};\n</script>\n\
         <script src=\"{CHART_JS_URL}\"></script>\n\
         <script>\nwindow.onload = () => {{\n\
         const canvas = document.getElementById('graficoHorario');\n\
         if (!canvas || typeof Chart === 'undefined') return;\n\
         new Chart(canvas.getContext('2d'), {{\n\
         type: 'line',\n\
         data: {{ labels: CHART_TIMES, datasets: [{{ label: 'Temperatura (°C)', data: CHART_TEMPS, tension: 0.4, fill: true }}] }},\n\
         options: {{ responsive: true, maintainAspectRatio: false, plugins: {{ legend: {{ display: false }} }}, scales: {{ y: {{ display: false }} }} }}\n\
         }});\n}};\n</script>\n"
    )
}

fn script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "[]".to_string())
        .replace('<', "\\u003c")
}

/// Escape text for HTML element content and quoted attributes
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
