use crate::data::panel::Panel;
use anyhow::{Context, Result};
use csv::Writer;
use std::io;
use std::path::Path;

//writes the panel in wide layout: quarter,quarter_end,<columns...>; absent cells stay empty
pub fn write_panel<W: io::Write>(panel: &Panel, out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);

    let mut header = vec!["quarter".to_string(), "quarter_end".to_string()];
    header.extend(panel.column_names().map(str::to_string));
    writer.write_record(&header)?;

    for row in panel.rows() {
        let mut record = vec![row.quarter.to_string(), row.quarter.end_date().to_string()];
        record.extend(
            row.values
                .iter()
                .map(|(_, cell)| cell.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

//writes present cells in long layout: quarter,series,value
pub fn write_long<W: io::Write>(panel: &Panel, out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(["quarter", "series", "value"])?;

    for row in panel.to_long() {
        writer.write_record([row.quarter.to_string(), row.series, row.value.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_panel_csv<P: AsRef<Path>>(panel: &Panel, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .context(format!("Failed to create panel CSV: {:?}", path))?;
    write_panel(panel, file)
}

pub fn write_long_csv<P: AsRef<Path>>(panel: &Panel, path: P) -> Result<()> {
    let path = path.as_ref();
    let file =
        std::fs::File::create(path).context(format!("Failed to create long CSV: {:?}", path))?;
    write_long(panel, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::quarter::QuarterKey;
    use crate::data::series::{AggregationRule, Frequency, SeriesRecord};
    use crate::engine::fusion::fuse;

    fn panel() -> Panel {
        let q = |y, n| QuarterKey::new(y, n).unwrap().start_date();
        let a = SeriesRecord::new(
            "starts",
            Frequency::Quarterly,
            AggregationRule::Mean,
            vec![(q(2021, 1), 25_000.0), (q(2021, 3), 30_500.5)],
        )
        .unwrap();
        let b = SeriesRecord::new(
            "rate",
            Frequency::Quarterly,
            AggregationRule::Last,
            vec![(q(2021, 2), 0.25)],
        )
        .unwrap();
        fuse(&[a, b]).unwrap()
    }

    #[test]
    fn test_wide_layout() {
        let mut buf = Vec::new();
        write_panel(&panel(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "quarter,quarter_end,starts,rate\n\
             2021Q1,2021-03-31,25000,\n\
             2021Q2,2021-06-30,,0.25\n\
             2021Q3,2021-09-30,30500.5,\n"
        );
    }

    #[test]
    fn test_long_layout() {
        let mut buf = Vec::new();
        write_long(&panel(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "quarter,series,value\n2021Q1,starts,25000\n2021Q2,rate,0.25\n2021Q3,starts,30500.5\n"
        );
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.csv");
        write_panel_csv(&panel(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("quarter,quarter_end,starts,rate\n"));
        assert_eq!(text.lines().count(), 4);
    }
}
