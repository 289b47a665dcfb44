//! UTCTime (tag 23) and DATE (tag 31, wire octets `1F 1F`) overlays.

use chrono::{FixedOffset, NaiveDate, TimeZone};

use super::{expect_primitive, UniversalType, TAG_DATE, TAG_UTC_TIME};
use crate::error::{Error, Result};
use crate::finding::Finding;
use crate::tag::{Tag, TagClass};
use crate::tlv::Tlv;

fn digits(s: &str, at: usize, len: usize, field: &'static str) -> Result<u32> {
    let slice = s
        .get(at..at + len)
        .ok_or(Error::ShapeMismatch {
            expected: "UTCTime (well-formed digit field)",
            found: field,
        })?;
    slice.parse::<u32>().map_err(|_| Error::ShapeMismatch {
        expected: "UTCTime (ASCII digits)",
        found: field,
    })
}

/// A parsed UTCTime: least-significant two digits of the year plus a
/// calendar date/time and an optional fixed UTC offset (`None` means `Z`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtcTime {
    pub year_short: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: Option<u32>,
    /// Offset in minutes east of UTC; `None` means the `Z` suffix form.
    pub offset_minutes: Option<i32>,
    findings: Vec<Finding>,
}

impl UtcTime {
    /// Builds a UTCTime from its fields, validating calendar ranges.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year_short: u32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: Option<u32>,
        offset_minutes: Option<i32>,
    ) -> Result<Self> {
        let value = Self {
            year_short,
            month,
            day,
            hour,
            minute,
            second,
            offset_minutes,
            findings: Vec::new(),
        };
        value.validate()?;
        Ok(value)
    }

    /// Interprets the two-digit year per X.509's pivot: 00-49 -> 20xx,
    /// 50-99 -> 19xx.
    pub fn full_year(&self) -> i32 {
        if self.year_short < 50 {
            2000 + self.year_short as i32
        } else {
            1900 + self.year_short as i32
        }
    }

    pub fn to_datetime(&self) -> Result<chrono::DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.offset_minutes.unwrap_or(0) * 60).ok_or(
            Error::TypedConstructionError {
                reason: "UTCTime offset out of range".into(),
            },
        )?;
        offset
            .with_ymd_and_hms(
                self.full_year(),
                self.month,
                self.day,
                self.hour,
                self.minute,
                self.second.unwrap_or(0),
            )
            .single()
            .ok_or(Error::TypedConstructionError {
                reason: "UTCTime does not name a real calendar instant".into(),
            })
    }

    fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month)
            || !(1..=31).contains(&self.day)
            || self.hour > 23
            || self.minute > 59
            || self.second.map_or(false, |s| s > 59)
        {
            return Err(Error::TypedConstructionError {
                reason: "UTCTime field out of range".into(),
            });
        }
        Ok(())
    }

    fn render(&self) -> String {
        let mut out = format!(
            "{:02}{:02}{:02}{:02}{:02}",
            self.year_short, self.month, self.day, self.hour, self.minute
        );
        if let Some(s) = self.second {
            out.push_str(&format!("{:02}", s));
        }
        match self.offset_minutes {
            None => out.push('Z'),
            Some(off) => {
                let sign = if off >= 0 { '+' } else { '-' };
                let off = off.abs();
                out.push(sign);
                out.push_str(&format!("{:02}{:02}", off / 60, off % 60));
            }
        }
        out
    }
}

impl UniversalType for UtcTime {
    const TAG_NUMBER: u64 = TAG_UTC_TIME;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_UTC_TIME, "UTCTime")?;
        let s = std::str::from_utf8(&data).map_err(|_| Error::ShapeMismatch {
            expected: "UTCTime (ASCII digits and Z/+/-)",
            found: "non-UTF-8 octets",
        })?;
        if s.len() < 11 {
            return Err(Error::ShapeMismatch {
                expected: "UTCTime (at least YYMMDDhhmmZ)",
                found: "string too short",
            });
        }

        let year_short = digits(s, 0, 2, "year")?;
        let month = digits(s, 2, 2, "month")?;
        let day = digits(s, 4, 2, "day")?;
        let hour = digits(s, 6, 2, "hour")?;
        let minute = digits(s, 8, 2, "minute")?;

        let mut findings = Vec::new();
        let rest = &s[10..];
        let (second, rest) = if rest.starts_with(|c: char| c.is_ascii_digit()) {
            if rest.len() < 2 {
                return Err(Error::ShapeMismatch {
                    expected: "UTCTime (two-digit seconds field)",
                    found: "truncated seconds field",
                });
            }
            let sec: u32 = rest[..2].parse().map_err(|_| Error::ShapeMismatch {
                expected: "UTCTime (ASCII digits)",
                found: "seconds",
            })?;
            (Some(sec), &rest[2..])
        } else {
            findings.push(Finding::new(
                "UTCTime omits the seconds field, which DER requires to be present",
            ));
            (None, rest)
        };

        let offset_minutes = match rest.chars().next() {
            Some('Z') if rest.len() == 1 => None,
            Some(sign @ ('+' | '-')) if rest.len() == 5 => {
                let hh: i32 = rest[1..3].parse().map_err(|_| Error::ShapeMismatch {
                    expected: "UTCTime (ASCII digits)",
                    found: "timezone hour",
                })?;
                let mm: i32 = rest[3..5].parse().map_err(|_| Error::ShapeMismatch {
                    expected: "UTCTime (ASCII digits)",
                    found: "timezone minute",
                })?;
                findings.push(Finding::new(
                    "UTCTime uses a local-time-plus-offset form, which DER forbids (Z required)",
                ));
                let magnitude = hh * 60 + mm;
                Some(if sign == '-' { -magnitude } else { magnitude })
            }
            _ => {
                return Err(Error::ShapeMismatch {
                    expected: "UTCTime (Z or +/-hhmm suffix)",
                    found: "malformed timezone suffix",
                })
            }
        };

        let parsed = UtcTime {
            year_short,
            month,
            day,
            hour,
            minute,
            second,
            offset_minutes,
            findings,
        };
        parsed.validate().map_err(|_| Error::ShapeMismatch {
            expected: "UTCTime (fields within calendar range)",
            found: "field out of range",
        })?;
        Ok(parsed)
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_UTC_TIME,
            },
            self.render().into_bytes(),
        )
    }

    fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn comment(&self) -> String {
        format!("UTCTime {}", self.render())
    }
}

/// DATE (tag 31, X.680:2015; wire octets `1F 1F`): a calendar date rendered
/// as `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub date: NaiveDate,
}

impl Date {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl UniversalType for Date {
    const TAG_NUMBER: u64 = TAG_DATE;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_DATE, "DATE")?;
        let s = std::str::from_utf8(&data).map_err(|_| Error::ShapeMismatch {
            expected: "DATE (YYYYMMDD in UTF-8)",
            found: "non-UTF-8 octets",
        })?;
        if s.len() != 8 {
            return Err(Error::ShapeMismatch {
                expected: "DATE (exactly YYYYMMDD, 8 digits)",
                found: "string of different length",
            });
        }
        let year: i32 = s[0..4].parse().map_err(|_| Error::ShapeMismatch {
            expected: "DATE (ASCII digits)",
            found: "year",
        })?;
        let month: u32 = s[4..6].parse().map_err(|_| Error::ShapeMismatch {
            expected: "DATE (ASCII digits)",
            found: "month",
        })?;
        let day: u32 = s[6..8].parse().map_err(|_| Error::ShapeMismatch {
            expected: "DATE (ASCII digits)",
            found: "day",
        })?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::ShapeMismatch {
            expected: "DATE (a real calendar date)",
            found: "out-of-range year/month/day",
        })?;
        Ok(Self { date })
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_DATE,
            },
            self.date.format("%Y%m%d").to_string().into_bytes(),
        )
    }

    fn findings(&self) -> &[Finding] {
        &[]
    }

    fn comment(&self) -> String {
        format!("DATE {}", self.date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_time_with_seconds_and_z_roundtrips() {
        let tlv = Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_UTC_TIME,
            },
            &b"190905202147Z"[..],
        );
        let parsed = UtcTime::from_tlv(&tlv).unwrap();
        assert_eq!(parsed.full_year(), 2019);
        assert!(parsed.findings().is_empty());
        assert_eq!(parsed.to_tlv().to_hex(), tlv.to_hex());
    }

    #[test]
    fn utc_time_without_seconds_is_a_finding() {
        let tlv = Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_UTC_TIME,
            },
            &b"1909052021Z"[..],
        );
        let parsed = UtcTime::from_tlv(&tlv).unwrap();
        assert!(parsed.second.is_none());
    }

    #[test]
    fn utc_time_with_offset_parses() {
        let tlv = Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_UTC_TIME,
            },
            &b"190905202147+0130"[..],
        );
        let parsed = UtcTime::from_tlv(&tlv).unwrap();
        assert_eq!(parsed.offset_minutes, Some(90));
    }

    #[test]
    fn date_roundtrips() {
        let d = Date::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        let tlv = d.to_tlv();
        assert_eq!(tlv.value().unwrap().as_ref(), b"20240305");
        let parsed = Date::from_tlv(&tlv).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn date_wire_identifier_is_1f1f() {
        let d = Date::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(&d.to_tlv().to_hex()[..4], "1f1f");
        assert!(Tlv::from_hex("1f1f083230323430333035").unwrap().as_date().is_ok());
    }
}
