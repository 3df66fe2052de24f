//! The typed operation catalog for the UIS dashboard.
//!
//! Each operation pairs its GraphQL document with the merge policy the
//! cache applies to it and a typed response schema. Response fields the
//! server may omit or null are `Option` — shape handling is explicit here,
//! not ad hoc at each use site. The risk scores, forecasts, and categories
//! below are opaque server output; the client renders them unchanged.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cache::MergePolicy;
use crate::client::GatewayError;

/// A named GraphQL operation with its cache merge policy.
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
    pub merge: MergePolicy,
}

/// Decode an operation's `data` payload into its typed schema.
pub fn decode<T: DeserializeOwned>(operation: &Operation, data: Value) -> Result<T, GatewayError> {
    serde_json::from_value(data).map_err(|e| GatewayError::Decode {
        field: operation.name.to_string(),
        message: e.to_string(),
    })
}

// ── Patients ──────────────────────────────────────────────────────

pub const GET_PATIENTS: Operation = Operation {
    name: "GetPatients",
    document: "query GetPatients($status: String, $search: String, $limit: Int, $offset: Int) {
  patients(status: $status, search: $search, limit: $limit, offset: $offset) {
    id
    firstName
    lastName
    email
    phone
    dateOfBirth
    gender
    insuranceProvider
    status
    balance
    lastVisit
    nextAppointment
  }
}",
    merge: MergePolicy::Replace,
};

/// Variables for [`GET_PATIENTS`]. Empty filters are sent as null, matching
/// the server's optional arguments.
pub fn patients_variables(
    search: Option<&str>,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Value {
    json!({
        "search": search,
        "status": status,
        "limit": limit,
        "offset": offset,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub insurance_provider: Option<String>,
    pub status: Option<String>,
    pub balance: Option<f64>,
    pub last_visit: Option<String>,
    pub next_appointment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientsData {
    pub patients: Vec<Patient>,
}

// ── Appointments (schedule) ───────────────────────────────────────

pub const GET_APPOINTMENTS: Operation = Operation {
    name: "GetAppointments",
    document: "query GetAppointments {
  appointments {
    data {
      appointmentId
      dateTime
      duration
      status
      notes
      patient {
        patientId
        firstName
        lastName
      }
      provider {
        providerId
        firstName
        lastName
      }
      operatory {
        operatoryId
        name
      }
    }
  }
  providers {
    providerId
    firstName
    lastName
    specialty
  }
}",
    merge: MergePolicy::Replace,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRef {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRef {
    pub provider_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operatory {
    pub operatory_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub appointment_id: String,
    pub date_time: String,
    pub duration: Option<i64>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub patient: Option<PatientRef>,
    pub provider: Option<ProviderRef>,
    pub operatory: Option<Operatory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentPage {
    pub data: Vec<Appointment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub provider_id: String,
    pub first_name: String,
    pub last_name: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentsData {
    pub appointments: AppointmentPage,
    pub providers: Vec<ProviderSummary>,
}

// ── Providers ─────────────────────────────────────────────────────

pub const GET_PROVIDERS: Operation = Operation {
    name: "GetProviders",
    document: "query GetProviders {
  providers {
    providerId
    firstName
    lastName
    providerType
    npi
    email
    phone
    isActive
  }
}",
    merge: MergePolicy::Normalized,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub provider_id: String,
    pub first_name: String,
    pub last_name: String,
    pub provider_type: Option<String>,
    pub npi: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersData {
    pub providers: Vec<Provider>,
}

// ── Today's schedule ──────────────────────────────────────────────

pub const GET_TODAYS_APPOINTMENTS: Operation = Operation {
    name: "GetTodaysAppointments",
    document: "query GetTodaysAppointments {
  todaysAppointments {
    id
    patientId
    patientName
    type
    status
    date
    time
    duration
    provider
    notes
  }
}",
    merge: MergePolicy::Normalized,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaysAppointment {
    pub id: String,
    pub patient_id: Option<String>,
    pub patient_name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<i64>,
    pub provider: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaysAppointmentsData {
    pub todays_appointments: Vec<TodaysAppointment>,
}

// ── Analytics ─────────────────────────────────────────────────────

pub const DASHBOARD_STATS: Operation = Operation {
    name: "DashboardStats",
    document: "query DashboardStats {
  analyticsStats {
    activePatients
    totalAppointments
    totalRevenue
  }
}",
    merge: MergePolicy::Normalized,
};

pub const GET_DASHBOARD_DATA: Operation = Operation {
    name: "GetDashboardData",
    document: "query GetDashboardData {
  analyticsStats {
    totalRevenue
    activePatients
    totalAppointments
    completedAppointments
    cancelledAppointments
    noShowRate
  }
  revenueMetrics(months: 6) {
    date
    production
    collections
    newPatients
  }
  todaysAppointments {
    id
    patientName
    time
    status
    type
    provider
  }
}",
    merge: MergePolicy::Normalized,
};

/// Practice-level analytics. Queries request different subsets of these
/// fields, so every one is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStats {
    pub total_revenue: Option<f64>,
    pub active_patients: Option<i64>,
    pub total_appointments: Option<i64>,
    pub completed_appointments: Option<i64>,
    pub cancelled_appointments: Option<i64>,
    pub no_show_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueMetric {
    pub date: String,
    pub production: Option<f64>,
    pub collections: Option<f64>,
    pub new_patients: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsData {
    pub analytics_stats: AnalyticsStats,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub analytics_stats: AnalyticsStats,
    pub revenue_metrics: Vec<RevenueMetric>,
    pub todays_appointments: Vec<TodaysAppointment>,
}

// ── AI predictions (command center) ───────────────────────────────

pub const GET_COMMAND_CENTER: Operation = Operation {
    name: "GetCommandCenter",
    document: "query GetCommandCenter {
  aiPredictionsSummary {
    highRiskAppointments
    mediumRiskAppointments
    lowRiskAppointments
    highRiskPatients
    nextMonthForecast
    confidenceLevel
  }
  noshowRisks(limit: 20) {
    appointmentId
    patientName
    dateTime
    type
    provider
    noshowRiskScore
    riskCategory
    dayOfWeek
    hourOfDay
  }
  churnRisks(limit: 20) {
    patientId
    firstName
    lastName
    churnRiskScore
    churnRiskCategory
    recommendedAction
    daysSinceVisit
    totalVisits
  }
  revenueForecast {
    forecastMonth
    monthOffset
    forecastProduction
    forecastCollections
    confidenceLevel
    growthRatePct
  }
  analyticsStats {
    totalRevenue
    activePatients
    totalAppointments
    completedAppointments
    cancelledAppointments
    noShowRate
  }
}",
    merge: MergePolicy::Normalized,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionsSummary {
    pub high_risk_appointments: Option<i64>,
    pub medium_risk_appointments: Option<i64>,
    pub low_risk_appointments: Option<i64>,
    pub high_risk_patients: Option<i64>,
    pub next_month_forecast: Option<f64>,
    pub confidence_level: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoshowRisk {
    pub appointment_id: String,
    pub patient_name: String,
    pub date_time: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub provider: Option<String>,
    pub noshow_risk_score: Option<f64>,
    pub risk_category: Option<String>,
    pub day_of_week: Option<String>,
    pub hour_of_day: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnRisk {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub churn_risk_score: Option<f64>,
    pub churn_risk_category: Option<String>,
    pub recommended_action: Option<String>,
    pub days_since_visit: Option<i64>,
    pub total_visits: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueForecast {
    pub forecast_month: String,
    pub month_offset: Option<i64>,
    pub forecast_production: Option<f64>,
    pub forecast_collections: Option<f64>,
    pub confidence_level: Option<f64>,
    pub growth_rate_pct: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandCenterData {
    pub ai_predictions_summary: PredictionsSummary,
    pub noshow_risks: Vec<NoshowRisk>,
    pub churn_risks: Vec<ChurnRisk>,
    pub revenue_forecast: Vec<RevenueForecast>,
    pub analytics_stats: AnalyticsStats,
}

// ── Patient detail ────────────────────────────────────────────────

pub const GET_PATIENT: Operation = Operation {
    name: "GetPatient",
    document: "query GetPatient($patientId: ID!) {
  patient(id: $patientId) {
    patientId
    firstName
    lastName
    dateOfBirth
    gender
    email
    phone
    address {
      street
      city
      state
      zip
    }
    status
    preferredProvider {
      providerId
      firstName
      lastName
    }
    appointments {
      appointmentId
      dateTime
      duration
      status
      provider {
        firstName
        lastName
      }
    }
    procedures {
      procedureId
      procedureCode
      description
      status
      completedDate
      fee
    }
    insurancePlans {
      planId
      payerName
      memberId
      groupNumber
      subscriberName
      annualMax
      annualUsed
    }
    balance
    createdAt
  }
}",
    merge: MergePolicy::Normalized,
};

pub fn patient_variables(patient_id: &str) -> Value {
    json!({ "patientId": patient_id })
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub procedure_id: String,
    pub procedure_code: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub completed_date: Option<String>,
    pub fee: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePlan {
    pub plan_id: String,
    pub payer_name: Option<String>,
    pub member_id: Option<String>,
    pub group_number: Option<String>,
    pub subscriber_name: Option<String>,
    pub annual_max: Option<f64>,
    pub annual_used: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub status: Option<String>,
    pub preferred_provider: Option<ProviderRef>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub procedures: Vec<Procedure>,
    #[serde(default)]
    pub insurance_plans: Vec<InsurancePlan>,
    pub balance: Option<f64>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientData {
    /// Null when the requested id is unknown to the server.
    pub patient: Option<PatientDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_operations_replace_wholesale() {
        assert_eq!(GET_PATIENTS.merge, MergePolicy::Replace);
        assert_eq!(GET_APPOINTMENTS.merge, MergePolicy::Replace);
        // Everything else keeps the normalized default.
        assert_eq!(GET_PROVIDERS.merge, MergePolicy::Normalized);
        assert_eq!(DASHBOARD_STATS.merge, MergePolicy::Normalized);
        assert_eq!(GET_COMMAND_CENTER.merge, MergePolicy::Normalized);
    }

    #[test]
    fn decode_patients_payload() {
        let data = serde_json::json!({
            "patients": [{
                "id": "p-1",
                "firstName": "Ana",
                "lastName": "Silva",
                "email": null,
                "phone": "555-0100",
                "balance": 120.5
            }]
        });

        let decoded: PatientsData = decode(&GET_PATIENTS, data).unwrap();
        assert_eq!(decoded.patients.len(), 1);
        assert_eq!(decoded.patients[0].first_name, "Ana");
        assert!(decoded.patients[0].email.is_none());
        assert_eq!(decoded.patients[0].balance, Some(120.5));
    }

    #[test]
    fn decode_mismatch_is_typed_error() {
        let data = serde_json::json!({"patients": "not-a-list"});
        let err = decode::<PatientsData>(&GET_PATIENTS, data).unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }));
    }

    #[test]
    fn decode_command_center_payload() {
        let data = serde_json::json!({
            "aiPredictionsSummary": {
                "highRiskAppointments": 4,
                "nextMonthForecast": 81250.0,
                "confidenceLevel": 0.87
            },
            "noshowRisks": [{
                "appointmentId": "a-9",
                "patientName": "J. Reyes",
                "noshowRiskScore": 0.72,
                "riskCategory": "high",
                "type": "hygiene"
            }],
            "churnRisks": [],
            "revenueForecast": [{
                "forecastMonth": "2026-09",
                "forecastProduction": 90000.0
            }],
            "analyticsStats": {"noShowRate": 0.08}
        });

        let decoded: CommandCenterData = decode(&GET_COMMAND_CENTER, data).unwrap();
        assert_eq!(decoded.noshow_risks[0].kind.as_deref(), Some("hygiene"));
        assert_eq!(decoded.ai_predictions_summary.high_risk_appointments, Some(4));
        assert_eq!(decoded.revenue_forecast[0].forecast_month, "2026-09");
        assert!(decoded.churn_risks.is_empty());
    }

    #[test]
    fn decode_missing_patient_is_none() {
        let data = serde_json::json!({"patient": null});
        let decoded: PatientData = decode(&GET_PATIENT, data).unwrap();
        assert!(decoded.patient.is_none());
    }

    #[test]
    fn patients_variables_send_null_filters() {
        let vars = patients_variables(None, Some("active"), 50, 0);
        assert!(vars["search"].is_null());
        assert_eq!(vars["status"], "active");
        assert_eq!(vars["limit"], 50);
    }
}
