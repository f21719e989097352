//! Enrollment phrase catalogs.
//!
//! Phrases are chosen for phonetic coverage at normal speaking pace: each
//! takes 2-4 seconds to read aloud, which keeps samples clear of the
//! short-recording quality penalty. The standard list is the first six of
//! the advanced list, so upgrading a profile re-reads nothing unfamiliar.

use voicegate_verify::EnrollmentLevel;

const EN_PHRASES: [&str; 12] = [
    "My voice confirms my identity for this workspace",
    "Security reviews are complete and ready for sign off",
    "Open the compliance dashboard and show pending findings",
    "Schedule the quarterly audit for the second week",
    "Access control changes require a second approval",
    "The incident report was filed before the deadline",
    "Framework mappings were updated across all controls",
    "Export the evidence package for the external auditor",
    "Risk acceptance must be renewed every ninety days",
    "Vendor assessments are due at the end of the month",
    "The retention policy applies to every archived report",
    "Close the finding once remediation has been verified",
];

const ES_PHRASES: [&str; 12] = [
    "Mi voz confirma mi identidad en este espacio de trabajo",
    "Las revisiones de seguridad están completas y listas para firmar",
    "Abre el panel de cumplimiento y muestra los hallazgos pendientes",
    "Programa la auditoría trimestral para la segunda semana",
    "Los cambios de control de acceso requieren una segunda aprobación",
    "El informe del incidente se presentó antes del plazo",
    "Los mapeos del marco se actualizaron en todos los controles",
    "Exporta el paquete de evidencias para el auditor externo",
    "La aceptación del riesgo debe renovarse cada noventa días",
    "Las evaluaciones de proveedores vencen a fin de mes",
    "La política de retención aplica a cada informe archivado",
    "Cierra el hallazgo una vez verificada la remediación",
];

/// Returns the phrase list for a level and language tag.
///
/// The level fixes the count (standard 6, advanced 12). Unrecognized
/// language tags fall back to English.
pub fn phrases_for(level: EnrollmentLevel, language: &str) -> Vec<String> {
    let catalog: &[&str; 12] = match language.split(['-', '_']).next().unwrap_or("") {
        "es" => &ES_PHRASES,
        _ => &EN_PHRASES,
    };
    catalog[..level.phrase_count()]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
