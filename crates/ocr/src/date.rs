use chrono::NaiveDate;
use regex::Regex;

use crate::lines::Line;
use crate::locale::{ConfigError, LocaleTable};

re!(re_year_first,
    r"(?:^|\D)(\d{4})\s*[/\-.年]\s*(\d{1,2})\s*[/\-.月]\s*(\d{1,2})(?:\s*日|\D|$)");
re!(re_year_last,
    r"(?:^|\D)(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})(?:\D|$)");

/// Date notations in the order they are tried. Every line is checked against
/// a notation before the next notation is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notation {
    /// `2024/07/28`, `2024-07-28`, `2024.07.28`, `2024年7月28日`. A trailing
    /// time (`2024/07/28 14:05`) ends the match at the space and is ignored.
    YearFirst,
    /// `07/28/2024`
    YearLast,
    /// `令和6年7月28日`
    Era,
}

const NOTATIONS: [Notation; 3] = [
    Notation::YearFirst,
    Notation::YearLast,
    Notation::Era,
];

/// Era names compiled into one pattern; offsets are looked up in the table.
pub(crate) struct DateMatcher {
    era: Option<Regex>,
}

impl DateMatcher {
    pub(crate) fn compile(table: &LocaleTable) -> Result<Self, ConfigError> {
        let names: Vec<String> = table
            .eras
            .iter()
            .filter(|e| !e.name.is_empty())
            .map(|e| regex::escape(&e.name))
            .collect();
        let era = if names.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"({})\s*(\d{{1,2}}|元)\s*年\s*(\d{{1,2}})\s*月\s*(\d{{1,2}})\s*日",
                names.join("|")
            ))?)
        };
        Ok(Self { era })
    }

    /// First valid date, or `None`. Invalid matches are skipped, never fatal.
    pub(crate) fn find(&self, table: &LocaleTable, lines: &[Line]) -> Option<NaiveDate> {
        NOTATIONS.iter().find_map(|notation| {
            lines
                .iter()
                .find_map(|line| self.match_line(table, *notation, &line.normalized))
        })
    }

    fn match_line(&self, table: &LocaleTable, notation: Notation, text: &str) -> Option<NaiveDate> {
        match notation {
            Notation::YearFirst => re_year_first()
                .captures_iter(text)
                .find_map(|c| ymd(&c[1], &c[2], &c[3])),
            Notation::YearLast => re_year_last().captures_iter(text).find_map(|c| {
                let first: u32 = c[1].parse().ok()?;
                let second: u32 = c[2].parse().ok()?;
                let year: i32 = c[3].parse().ok()?;
                // Month first; a first field that cannot be a month is a day.
                validated(year, first, second).or_else(|| {
                    if first > 12 {
                        validated(year, second, first)
                    } else {
                        None
                    }
                })
            }),
            Notation::Era => self.era.as_ref()?.captures_iter(text).find_map(|c| {
                let offset = table.era_offset(&c[1])?;
                let era_year: i32 = if &c[2] == "元" { 1 } else { c[2].parse().ok()? };
                validated(offset + era_year, c[3].parse().ok()?, c[4].parse().ok()?)
            }),
        }
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    validated(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn validated(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if year <= 1900 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::split_lines;
    use crate::locale::Era;

    fn find(text: &str) -> Option<NaiveDate> {
        let table = LocaleTable::japanese();
        let matcher = DateMatcher::compile(&table).unwrap();
        matcher.find(&table, &split_lines(text))
    }

    fn d(y: i32, m: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, day)
    }

    #[test]
    fn year_first_separators() {
        assert_eq!(find("2024/07/28"), d(2024, 7, 28));
        assert_eq!(find("2024-7-8"), d(2024, 7, 8));
        assert_eq!(find("2024.07.28(日)"), d(2024, 7, 28));
        assert_eq!(find("2024年7月28日"), d(2024, 7, 28));
        assert_eq!(find("日付 2024年 7月 28日 14:05"), d(2024, 7, 28));
    }

    #[test]
    fn year_first_with_time() {
        assert_eq!(find("2024/07/28 14:05 レジ3"), d(2024, 7, 28));
        assert_eq!(find("2024-07-28 09:30:15"), d(2024, 7, 28));
        // Timed and untimed dates share a notation, so line order decides.
        assert_eq!(find("2024/07/28 14:05\n2024/08/01"), d(2024, 7, 28));
    }

    #[test]
    fn year_last_is_month_first() {
        assert_eq!(find("07/28/2024"), d(2024, 7, 28));
        assert_eq!(find("28/07/2024"), d(2024, 7, 28));
        assert_eq!(find("03/04/2024"), d(2024, 3, 4));
    }

    #[test]
    fn era_dates() {
        assert_eq!(find("令和6年7月28日"), d(2024, 7, 28));
        assert_eq!(find("令和元年5月1日"), d(2019, 5, 1));
        assert_eq!(find("平成31年4月30日"), d(2019, 4, 30));
        assert_eq!(find("令和６年７月２８日"), d(2024, 7, 28));
    }

    #[test]
    fn era_offsets_come_from_the_table() {
        let mut table = LocaleTable::japanese();
        table.eras.push(Era { name: "昭和".to_string(), offset: 1925 });
        let matcher = DateMatcher::compile(&table).unwrap();
        let lines = split_lines("昭和64年1月7日");
        assert_eq!(matcher.find(&table, &lines), d(1989, 1, 7));
        assert_eq!(find("昭和64年1月7日"), None);
    }

    #[test]
    fn invalid_dates_fall_through() {
        assert_eq!(find("2024/13/01\n2024/02/30\n2024/02/29"), d(2024, 2, 29));
        assert_eq!(find("1899/01/01"), None);
        assert_eq!(find("2024/07/281"), None);
    }

    #[test]
    fn notation_order_beats_line_order() {
        assert_eq!(find("07/01/2023\n2024/07/28"), d(2024, 7, 28));
        assert_eq!(find("令和5年1月1日\n2024-07-28"), d(2024, 7, 28));
    }

    #[test]
    fn phone_numbers_are_not_dates() {
        assert_eq!(find("TEL 0120-12-3456"), None);
        assert_eq!(find("03-1234-5678"), None);
    }

    #[test]
    fn no_date() {
        assert_eq!(find("合計 ¥450"), None);
    }
}
