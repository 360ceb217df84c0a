use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_pe,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct ExecutableInfo {
    pub architecture: String,
    pub machine: String,
    pub characteristics: String,
    pub time_date_stamp: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_offset: Option<String>,
    pub sections: Vec<SectionInfo>,
    pub icons: Vec<IconInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_icon: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SectionInfo {
    pub name: String,
    pub virtual_address: String,
    pub virtual_size: u32,
    pub raw_offset: String,
    pub raw_size: u32,
}

#[derive(Debug, Serialize)]
pub struct IconInfo {
    pub width: u32,
    pub height: u32,
    pub source: String,
}

pub fn run(path: &Path, strict: bool, opts: &GlobalOptions) -> anyhow::Result<()> {
    let pe = load_pe(path, strict)?;
    let coff = pe.coff_header();
    let optional = pe.optional_header();

    let machine = coff
        .machine_type()
        .map_or_else(|| format!("0x{:04X}", coff.machine), |m| m.to_string());
    let characteristics = coff
        .flags()
        .iter_names()
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join(" | ");

    let sections = pe
        .sections()
        .iter()
        .map(|section| SectionInfo {
            name: section.name.clone(),
            virtual_address: format!("0x{:08X}", section.virtual_address),
            virtual_size: section.virtual_size,
            raw_offset: format!("0x{:08X}", section.pointer_to_raw_data),
            raw_size: section.size_of_raw_data,
        })
        .collect();

    let decoded = pe.icons();
    let best = pe.best_icon();
    let best_icon = best
        .as_ref()
        .and_then(|best| decoded.iter().position(|icon| icon == best));
    let icons = decoded
        .iter()
        .map(|icon| IconInfo {
            width: icon.width(),
            height: icon.height(),
            source: icon.source().to_string(),
        })
        .collect();

    let info = ExecutableInfo {
        architecture: pe.architecture().to_string(),
        machine,
        characteristics,
        time_date_stamp: coff.time_date_stamp,
        format: optional.and_then(|o| o.magic()).map(|m| m.to_string()),
        entry_point: optional.map(|o| format!("0x{:08X}", o.standard().address_of_entry_point)),
        image_base: optional
            .and_then(|o| o.windows())
            .map(|w| format!("0x{:X}", w.image_base)),
        subsystem: optional.and_then(|o| o.windows()).map(|w| w.subsystem),
        resource_offset: pe.resource_base().map(|offset| format!("0x{offset:X}")),
        sections,
        icons,
        best_icon,
    };

    print_output(&info, opts, |info| {
        println!("Architecture:    {}", info.architecture);
        println!("Machine:         {}", info.machine);
        if let Some(format) = &info.format {
            println!("Format:          {format}");
        }
        if !info.characteristics.is_empty() {
            println!("Characteristics: {}", info.characteristics);
        }
        println!("Timestamp:       0x{:08X}", info.time_date_stamp);
        if let Some(entry_point) = &info.entry_point {
            println!("Entry point:     {entry_point}");
        }
        if let Some(image_base) = &info.image_base {
            println!("Image base:      {image_base}");
        }
        if let Some(subsystem) = info.subsystem {
            println!("Subsystem:       {subsystem}");
        }
        if let Some(offset) = &info.resource_offset {
            println!("Resources at:    {offset}");
        }

        println!();
        println!("Sections ({}):", info.sections.len());
        if !info.sections.is_empty() {
            let mut table = TabWriter::new(&[
                ("Name", Align::Left),
                ("RVA", Align::Left),
                ("VSize", Align::Right),
                ("Offset", Align::Left),
                ("Size", Align::Right),
            ])
            .indent("  ");
            for section in &info.sections {
                table.row(vec![
                    section.name.clone(),
                    section.virtual_address.clone(),
                    section.virtual_size.to_string(),
                    section.raw_offset.clone(),
                    section.raw_size.to_string(),
                ]);
            }
            table.print();
        }

        println!();
        println!("Icons ({}):", info.icons.len());
        if !info.icons.is_empty() {
            let mut table = TabWriter::new(&[
                ("#", Align::Right),
                ("Size", Align::Left),
                ("Source", Align::Left),
                ("", Align::Left),
            ])
            .indent("  ");
            for (index, icon) in info.icons.iter().enumerate() {
                let marker = if info.best_icon == Some(index) { "best" } else { "" };
                table.row(vec![
                    index.to_string(),
                    format!("{}x{}", icon.width, icon.height),
                    icon.source.clone(),
                    marker.to_string(),
                ]);
            }
            table.print();
        }
    })
}
