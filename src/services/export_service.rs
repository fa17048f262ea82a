use crate::error::{Error, Result};
use crate::models::weather_log::WeatherLog;
use crate::utils::time::export_stamp;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::*;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const CSV_HEADER: [&str; 15] = [
    "timestamp",
    "city",
    "latitude",
    "longitude",
    "temperature",
    "apparent_temperature",
    "humidity",
    "pressure",
    "wind_speed",
    "wind_direction",
    "precipitation",
    "rain_probability",
    "cloud_cover",
    "weather_code",
    "condition",
];

pub struct ExportService;

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ExportService {
    pub fn filename(extension: &str, at: DateTime<Utc>) -> String {
        format!("weather_logs_{}.{}", export_stamp(at), extension)
    }

    pub fn to_csv(logs: &[WeatherLog]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for log in logs {
            writer.write_record([
                log.recorded_at.to_rfc3339(),
                log.city.clone().unwrap_or_default(),
                opt_cell(log.latitude),
                opt_cell(log.longitude),
                log.temperature.to_string(),
                opt_cell(log.apparent_temperature),
                log.humidity.to_string(),
                opt_cell(log.pressure),
                log.wind_speed.to_string(),
                opt_cell(log.wind_direction),
                opt_cell(log.precipitation),
                opt_cell(log.rain_probability),
                opt_cell(log.cloud_cover),
                opt_cell(log.weather_code),
                log.condition.clone().unwrap_or_default(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| Error::Internal(format!("CSV buffer flush failed: {}", e)))
    }

    /// Styled workbook with a single "Weather Logs" sheet.
    pub fn to_xlsx(logs: &[WeatherLog]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Weather Logs")?;

        let primary = Color::RGB(0x0C4A6E); // Sky 900
        let header_bg = Color::RGB(0x075985);
        let stripe = Color::RGB(0xF0F9FF);
        let border = Color::RGB(0xE2E8F0);

        let columns: [(&str, f64); 15] = [
            ("Timestamp (UTC)", 20.0),
            ("City", 22.0),
            ("Latitude", 11.0),
            ("Longitude", 11.0),
            ("Temperature (°C)", 15.0),
            ("Feels like (°C)", 15.0),
            ("Humidity (%)", 13.0),
            ("Pressure (hPa)", 14.0),
            ("Wind (km/h)", 12.0),
            ("Wind dir (°)", 12.0),
            ("Precipitation (mm)", 17.0),
            ("Rain chance (%)", 15.0),
            ("Cloud cover (%)", 15.0),
            ("WMO code", 10.0),
            ("Condition", 24.0),
        ];
        let last_col = (columns.len() - 1) as u16;

        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        let title_format = Format::new()
            .set_font_size(14)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(primary)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 32)?;
        let title = format!(
            "Weather logs, exported {}",
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        );
        worksheet.merge_range(0, 0, 0, last_col, &title, &title_format)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(border);

        let header_row = 1;
        worksheet.set_row_height(header_row, 28)?;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        let data_start_row = 2;
        for (idx, log) in logs.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { stripe } else { Color::White };

            let text_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_border(FormatBorder::Thin)
                .set_border_color(border);
            let num_fmt = text_fmt.clone().set_num_format("0.0#");
            let int_fmt = text_fmt.clone().set_align(FormatAlign::Center);

            worksheet.write_string_with_format(
                row,
                0,
                log.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                &text_fmt,
            )?;
            worksheet.write_string_with_format(row, 1, log.city.as_deref().unwrap_or(""), &text_fmt)?;

            let numbers = [
                (2, log.latitude),
                (3, log.longitude),
                (4, Some(log.temperature)),
                (5, log.apparent_temperature),
                (6, Some(log.humidity)),
                (7, log.pressure),
                (8, Some(log.wind_speed)),
                (9, log.wind_direction),
                (10, log.precipitation),
                (11, log.rain_probability),
                (12, log.cloud_cover),
            ];
            for (col, value) in numbers {
                match value {
                    Some(v) => worksheet.write_number_with_format(row, col, v, &num_fmt)?,
                    None => worksheet.write_blank(row, col, &text_fmt)?,
                };
            }

            match log.weather_code {
                Some(code) => worksheet.write_number_with_format(row, 13, code as f64, &int_fmt)?,
                None => worksheet.write_blank(row, 13, &text_fmt)?,
            };
            worksheet.write_string_with_format(
                row,
                14,
                log.condition.as_deref().unwrap_or(""),
                &text_fmt,
            )?;
        }

        let summary_row = data_start_row + logs.len() as u32 + 1;
        let summary_fmt = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(primary)
            .set_background_color(Color::RGB(0xE0F2FE))
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
            .set_border_color(border);

        let count = logs.len();
        let (avg_temp, avg_humidity) = if count == 0 {
            (0.0, 0.0)
        } else {
            (
                logs.iter().map(|l| l.temperature).sum::<f64>() / count as f64,
                logs.iter().map(|l| l.humidity).sum::<f64>() / count as f64,
            )
        };
        worksheet.merge_range(
            summary_row,
            0,
            summary_row,
            last_col,
            &format!(
                "Readings: {}  |  Avg temperature: {:.1} °C  |  Avg humidity: {:.0} %",
                count, avg_temp, avg_humidity
            ),
            &summary_fmt,
        )?;

        worksheet.set_freeze_panes(data_start_row, 0)?;
        let last_data_row = (data_start_row + count as u32).saturating_sub(1).max(header_row);
        worksheet.autofilter(header_row, 0, last_data_row, last_col)?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample(city: Option<&str>, rain: Option<f64>) -> WeatherLog {
        let at = DateTime::parse_from_rfc3339("2025-12-04T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        WeatherLog {
            id: Uuid::new_v4(),
            recorded_at: at,
            city: city.map(str::to_string),
            latitude: Some(-2.53),
            longitude: Some(-44.3),
            temperature: 28.5,
            apparent_temperature: None,
            humidity: 65.0,
            pressure: Some(1013.25),
            wind_speed: 15.4,
            wind_direction: Some(180.0),
            precipitation: Some(0.0),
            rain_probability: rain,
            cloud_cover: Some(25.0),
            weather_code: Some(1),
            condition: Some("Mainly clear, light breeze".into()),
            created_at: at,
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_log() {
        let bytes = ExportService::to_csv(&[sample(Some("São Luís"), None), sample(None, Some(40.0))]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,city,latitude,longitude,temperature,apparent_temperature,humidity,pressure,wind_speed,wind_direction,precipitation,rain_probability,cloud_cover,weather_code,condition"
        );
        assert_eq!(
            lines[1],
            "2025-12-04T10:00:00+00:00,São Luís,-2.53,-44.3,28.5,,65,1013.25,15.4,180,0,,25,1,\"Mainly clear, light breeze\""
        );
        assert!(lines[2].starts_with("2025-12-04T10:00:00+00:00,,"));
        assert!(lines[2].contains(",40,"));
    }

    #[test]
    fn empty_csv_is_just_the_header() {
        let text = String::from_utf8(ExportService::to_csv(&[]).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = ExportService::to_xlsx(&[sample(Some("Natal"), Some(10.0))]).unwrap();
        assert!(bytes.starts_with(b"PK"));
        let empty = ExportService::to_xlsx(&[]).unwrap();
        assert!(empty.starts_with(b"PK"));
    }

    #[test]
    fn filename_uses_minute_stamp() {
        let at = DateTime::parse_from_rfc3339("2025-01-31T07:05:59Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(ExportService::filename("csv", at), "weather_logs_20250131_0705.csv");
    }
}
