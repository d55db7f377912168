use crate::classify::Category;
use crate::error::{CustomError, Result};
use crate::summary::ChromosomeSummary;
use ndarray::{Array1, Array2};
use ndarray_npy::NpzWriter;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const FONT: &str = "dejavu-sans-mono";
const BP_PER_MB: f64 = 1_000_000.0;

/// Categories drawn on the per-chromosome plot.
const PLOTTED: [(Category, RGBColor); 5] = [
    (Category::IsHomozygous, RGBColor(120, 120, 120)),
    (Category::MaternalUniparentalAmbiguous, RGBColor(255, 150, 170)),
    (Category::MaternalUniparentalIsodisomy, RGBColor(200, 20, 60)),
    (Category::PaternalUniparentalAmbiguous, RGBColor(130, 170, 255)),
    (Category::PaternalUniparentalIsodisomy, RGBColor(20, 60, 200)),
];

fn count_column(category: Category) -> String {
    format!("{}_count", category.name())
}

fn header() -> Vec<String> {
    let mut header: Vec<String> = ["chrom", "start", "end", "variant_count"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(Category::ALL.iter().map(|&c| count_column(c)));
    header.extend(
        Category::PROPORTIONED
            .iter()
            .map(|&c| format!("prop_{}", count_column(c))),
    );
    header.push("prop_me".to_string());
    header.extend(
        Category::UPD
            .iter()
            .map(|&c| format!("p_{}", count_column(c))),
    );
    header.extend(
        Category::UPD
            .iter()
            .map(|&c| format!("sig_prop_{}", count_column(c))),
    );
    header
}

pub fn write_block_table(summaries: &[ChromosomeSummary], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(header())?;

    for summary in summaries {
        for row in &summary.blocks {
            let block = &row.block;
            let mut record = vec![
                block.chromosome.clone(),
                block.start.to_string(),
                block.end.to_string(),
                block.variant_count.to_string(),
            ];
            record.extend(block.counts().iter().map(|c| c.to_string()));
            record.extend(
                row.proportions
                    .all()
                    .map(|p| p.map(|p| format!("{:.6}", p)).unwrap_or_default()),
            );
            record.extend(
                row.significance
                    .tests()
                    .iter()
                    .map(|t| format!("{:.6e}", t.p_value)),
            );
            record.extend(
                row.significance
                    .tests()
                    .iter()
                    .map(|t| t.significant.to_string()),
            );
            wtr.write_record(&record)?;
        }
    }
    wtr.flush().map_err(|e| CustomError::Write {
        source: e,
        path: path.into(),
    })?;
    Ok(())
}

/// Write raw block counts as an npz archive with an embedded `blocks.json` of labels.
pub fn write_block_counts_npz(summaries: &[ChromosomeSummary], path: &Path) -> Result<()> {
    let blocks: Vec<_> = summaries
        .iter()
        .flat_map(|s| s.blocks.iter().map(|row| &row.block))
        .collect();
    let n_columns = Category::COUNT + 1;
    let counts = Array2::from_shape_fn((blocks.len(), n_columns), |(i, j)| {
        if j == 0 {
            blocks[i].variant_count
        } else {
            blocks[i].counts()[j - 1]
        }
    });
    let starts: Array1<u64> = blocks.iter().map(|b| b.start).collect();
    let ends: Array1<u64> = blocks.iter().map(|b| b.end).collect();

    let f = File::create(path).map_err(|e| CustomError::Write {
        source: e,
        path: path.into(),
    })?;
    let mut npz = NpzWriter::new(f);
    npz.add_array("counts", &counts)?;
    npz.add_array("starts", &starts)?;
    npz.add_array("ends", &ends)?;
    npz.finish()?;

    let mut columns = vec!["variant_count".to_string()];
    columns.extend(Category::ALL.iter().map(|&c| count_column(c)));
    let labels = serde_json::json!({
        "chromosomes": blocks.iter().map(|b| b.chromosome.as_str()).collect::<Vec<_>>(),
        "columns": columns,
    });
    let json = serde_json::to_vec_pretty(&labels)?;

    let f = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| CustomError::Write {
            source: e,
            path: path.into(),
        })?;
    let mut archive = ZipWriter::new_append(f)?;
    archive.start_file("blocks.json", SimpleFileOptions::default())?;
    archive.write_all(&json).map_err(|e| CustomError::Write {
        source: e,
        path: path.into(),
    })?;
    archive.finish()?;
    Ok(())
}

fn plot_error(
    chromosome: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> CustomError {
    CustomError::Plot {
        chromosome: chromosome.to_string(),
        source: Box::new(source),
    }
}

pub fn plot_chromosome(summary: &ChromosomeSummary, path: &Path) -> Result<()> {
    const DEJAVU_SANS_MONO: &[u8] =
        include_bytes!("../assets/fonts/dejavu-sans-mono/DejaVuSansMono.ttf");
    register_font(FONT, FontStyle::Normal, DEJAVU_SANS_MONO).map_err(|_| CustomError::Font)?;

    let chromosome = summary.chromosome.as_str();
    let x_max = summary
        .blocks
        .iter()
        .map(|row| row.block.end as f64 / BP_PER_MB)
        .fold(1.0f64, f64::max);

    let root_area = BitMapBackend::new(path, (2400, 1200)).into_drawing_area();
    root_area
        .fill(&WHITE)
        .map_err(|e| plot_error(chromosome, e))?;

    let mut chart = ChartBuilder::on(&root_area)
        .set_label_area_size(LabelAreaPosition::Left, 140)
        .set_label_area_size(LabelAreaPosition::Bottom, 110)
        .margin(20)
        .margin_right(60)
        .caption(format!("Chromosome {chromosome}"), (FONT, 56))
        .build_cartesian_2d(0f64..x_max, 0f64..1f64)
        .map_err(|e| plot_error(chromosome, e))?;

    chart
        .configure_mesh()
        .label_style((FONT, 32))
        .x_desc("Block end (Mb)")
        .y_desc("Proportion of variants")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.1}", y))
        .draw()
        .map_err(|e| plot_error(chromosome, e))?;

    for (category, color) in PLOTTED {
        let points: Vec<Option<(f64, f64)>> = summary
            .blocks
            .iter()
            .map(|row| {
                row.proportions
                    .get(category)
                    .map(|p| (row.block.end as f64 / BP_PER_MB, p))
            })
            .collect();

        // Masked blocks break the line
        chart
            .draw_series(
                points
                    .split(|p| p.is_none())
                    .filter(|run| run.len() > 1)
                    .map(|run| {
                        PathElement::new(
                            run.iter().flatten().copied().collect::<Vec<_>>(),
                            color.stroke_width(3),
                        )
                    }),
            )
            .map_err(|e| plot_error(chromosome, e))?;

        chart
            .draw_series(
                points
                    .iter()
                    .flatten()
                    .map(|&p| Circle::new(p, 5, color.filled())),
            )
            .map_err(|e| plot_error(chromosome, e))?
            .label(category.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], color.stroke_width(4)));
    }

    chart
        .configure_series_labels()
        .label_font((FONT, 30))
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(|e| plot_error(chromosome, e))?;

    root_area
        .present()
        .map_err(|e| plot_error(chromosome, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lists_every_column_once() {
        let header = header();
        assert_eq!(header.len(), 4 + 9 + 9 + 4 + 4);
        assert_eq!(header[4], "alleles_identical_to_dad_count");
        assert!(header.contains(&"prop_me".to_string()));
        assert!(header.contains(&"sig_prop_matches_maternal_uniparental_isodisomy_count".to_string()));
        let unique: std::collections::HashSet<_> = header.iter().collect();
        assert_eq!(unique.len(), header.len());
    }
}
