use aarogya_data::models::appointment::AppointmentRow;
use aarogya_data::models::emergency::EmergencyAlertRow;
use aarogya_data::models::health_record::HealthRecordRow;
use aarogya_data::models::user::UserRecord;

use crate::entities::{Appointment, EmergencyAlert, HealthRecord, User};

/// Conversion functions between data models and domain entities.
/// These functions follow the pattern convert_to_domain_[model_name].

/// Convert a stored user record to the domain entity, dropping the password hash
pub fn convert_to_domain_user(record: UserRecord) -> User {
    User {
        id: record.id,
        phone_number: record.phone_number,
        email: record.email,
        full_name: record.full_name,
        date_of_birth: record.date_of_birth,
        gender: record.gender,
        role: record.role,
        village: record.village,
        district: record.district,
        state: record.state,
        pincode: record.pincode,
        preferred_language: record.preferred_language,
        emergency_contact: record.emergency_contact,
        is_active: record.is_active,
        is_verified: record.is_verified,
        created_at: record.created_at,
        last_login: record.last_login,
    }
}

/// Convert a stored health record to the domain entity.
/// Recommendations are stored as a JSON array of strings; anything that
/// fails to parse is treated as an empty list.
pub fn convert_to_domain_health_record(row: HealthRecordRow) -> HealthRecord {
    let recommendations = row
        .recommendations
        .as_deref()
        .and_then(|json| serde_json::from_str(json).ok())
        .unwrap_or_default();

    HealthRecord {
        id: row.id,
        patient_id: row.patient_id,
        recorded_by: row.recorded_by,
        systolic: row.systolic,
        diastolic: row.diastolic,
        heart_rate: row.heart_rate,
        temperature: row.temperature,
        weight: row.weight,
        height: row.height,
        oxygen_saturation: row.oxygen_saturation,
        symptoms: row.symptoms,
        diagnosis: row.diagnosis,
        medications: row.medications,
        notes: row.notes,
        risk_score: row.risk_score,
        risk_level: row.risk_level,
        recommendations,
        recorded_at: row.recorded_at,
    }
}

/// Convert a stored appointment to the domain entity
pub fn convert_to_domain_appointment(row: AppointmentRow) -> Appointment {
    Appointment {
        id: row.id,
        patient_id: row.patient_id,
        asha_worker_id: row.asha_worker_id,
        appointment_date: row.appointment_date,
        appointment_type: row.appointment_type,
        status: row.status,
        location: row.location,
        notes: row.notes,
        reminder_sent: row.reminder_sent,
        created_at: row.created_at,
    }
}

/// Convert a stored emergency alert to the domain entity
pub fn convert_to_domain_alert(row: EmergencyAlertRow) -> EmergencyAlert {
    EmergencyAlert {
        id: row.id,
        patient_id: row.patient_id,
        alert_type: row.alert_type,
        severity: row.severity,
        description: row.description,
        location_lat: row.location_lat,
        location_lng: row.location_lng,
        address: row.address,
        status: row.status,
        responder_id: row.responder_id,
        created_at: row.created_at,
        resolved_at: row.resolved_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record_row() -> HealthRecordRow {
        HealthRecordRow {
            id: "rec-1".to_string(),
            patient_id: "patient-1".to_string(),
            recorded_by: None,
            systolic: Some(120),
            diastolic: Some(80),
            heart_rate: Some(72),
            temperature: Some(98.6),
            weight: Some(60.0),
            height: Some(165.0),
            oxygen_saturation: None,
            symptoms: None,
            diagnosis: None,
            medications: None,
            notes: None,
            risk_score: Some(0.0),
            risk_level: Some("low".to_string()),
            recommendations: Some(r#"["rest"]"#.to_string()),
            recorded_at: "2026-08-01T10:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_recommendations_parsed_from_json() {
        let record = convert_to_domain_health_record(sample_record_row());
        assert_eq!(record.recommendations, vec!["rest".to_string()]);
    }

    #[test]
    fn test_malformed_recommendations_become_empty() {
        let mut row = sample_record_row();
        row.recommendations = Some("not json".to_string());
        let record = convert_to_domain_health_record(row);
        assert!(record.recommendations.is_empty());
    }
}
