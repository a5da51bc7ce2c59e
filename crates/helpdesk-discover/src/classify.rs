//! Heuristic device classification from SNMP text and hostnames.

use helpdesk_core::{Classification, DeviceSignature, EquipmentType};

/// Category keywords tested against sysDescr, first match wins.
const DESCRIPTION_CATEGORIES: &[(&[&str], EquipmentType)] = &[
    (&["switch"], EquipmentType::Switch),
    (&["router"], EquipmentType::Router),
    (&["printer"], EquipmentType::Printer),
    (&["access point", "ap"], EquipmentType::AccessPoint),
    (&["server"], EquipmentType::Server),
    (&["windows", "linux"], EquipmentType::Desktop),
];

const HOSTNAME_CATEGORIES: &[(&str, EquipmentType)] = &[
    ("switch", EquipmentType::Switch),
    ("router", EquipmentType::Router),
    ("printer", EquipmentType::Printer),
    ("server", EquipmentType::Server),
];

/// (keywords, manufacturer)
const VENDORS: &[(&[&str], &str)] = &[
    (&["cisco"], "Cisco"),
    (&["hp", "hewlett"], "HP"),
    (&["dell"], "Dell"),
    (&["juniper"], "Juniper"),
    (&["netgear"], "Netgear"),
    (&["d-link"], "D-Link"),
];

const LINUX_DISTROS: &[(&str, &str)] = &[
    ("ubuntu", "Ubuntu"),
    ("centos", "CentOS"),
    ("red hat", "Red Hat"),
    ("debian", "Debian"),
];

/// Best-guess type, vendor, model and OS for a device.
///
/// The equipment type comes from category keywords in sysDescr, falling back
/// to the hostname when the description names no category. Vendor and OS
/// detection fill in manufacturer, model and OS but never change the type.
pub fn classify(signature: Option<&DeviceSignature>, hostname: Option<&str>) -> Classification {
    let mut out = Classification::default();
    let description = signature.and_then(|s| s.system_description.as_deref());

    let mut category = None;
    if let Some(descr) = description {
        let lower = descr.to_lowercase();
        category = category_from_description(&lower);

        if let Some((keyword, vendor)) = detect_vendor(&lower) {
            out.manufacturer = Some(vendor.to_string());
            out.model = model_after(descr, keyword);
        }
        detect_os(descr, &lower, &mut out);
    }

    out.equipment_type = category
        .or_else(|| hostname.and_then(category_from_hostname))
        .unwrap_or(EquipmentType::Unknown);
    out
}

fn category_from_description(lower: &str) -> Option<EquipmentType> {
    DESCRIPTION_CATEGORIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, ty)| *ty)
}

fn category_from_hostname(hostname: &str) -> Option<EquipmentType> {
    let lower = hostname.to_lowercase();
    HOSTNAME_CATEGORIES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, ty)| *ty)
}

/// Returns the keyword that matched along with the manufacturer name.
fn detect_vendor(lower: &str) -> Option<(&'static str, &'static str)> {
    VENDORS.iter().find_map(|(keywords, vendor)| {
        keywords
            .iter()
            .find(|k| lower.contains(*k))
            .map(|k| (*k, *vendor))
    })
}

/// The whitespace token following the first token that contains `keyword`.
fn model_after(descr: &str, keyword: &str) -> Option<String> {
    let mut tokens = descr.split_whitespace();
    tokens.find(|t| t.to_lowercase().contains(keyword))?;
    tokens.next().map(str::to_string)
}

fn detect_os(descr: &str, lower: &str, out: &mut Classification) {
    if lower.contains("windows") {
        out.os_name = Some("Windows".to_string());
        out.os_version = [
            ("Windows Server", "Server"),
            ("Windows 10", "10"),
            ("Windows 11", "11"),
        ]
        .iter()
        .find(|(needle, _)| descr.contains(needle))
        .map(|(_, version)| version.to_string());
        out.manufacturer.get_or_insert_with(|| "Microsoft".to_string());
    } else if lower.contains("linux") {
        out.os_name = Some("Linux".to_string());
        if out.manufacturer.is_none() {
            out.manufacturer = LINUX_DISTROS
                .iter()
                .find(|(needle, _)| lower.contains(needle))
                .map(|(_, distro)| distro.to_string());
        }
    }
}
