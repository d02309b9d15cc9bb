// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for attack simulation.

use super::attacks::{Endpoint, ForwardedFor, PayloadKind};
use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// Build the `X-Forwarded-For` value for request `index` from `client`.
pub fn forwarded_for(mode: ForwardedFor, client: IpAddr, index: usize) -> String {
    match mode {
        ForwardedFor::Client => client.to_string(),
        ForwardedFor::RotatingProxies => {
            let hops = 1 + index % 3;
            let proxies: Vec<String> = (0..hops)
                .map(|h| format!("172.16.{}.{}", index % 256, h + 1))
                .collect();
            format!("{}, {}", client, proxies.join(", "))
        }
        ForwardedFor::SpoofedFirstHop => {
            let forged = Ipv4Addr::new(198, 18, ((index >> 8) & 0xFF) as u8, (index & 0xFF) as u8);
            format!("{}, {}", forged, client)
        }
    }
}

/// Markup an attacker might try to smuggle into a spreadsheet or admin view.
pub fn generate_markup_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert('xss')</script>",
        "<img src=x onerror=alert(1)>",
        "\"><svg/onload=fetch('//evil.example')>",
        "<<b>>doble<</b>>",
        "   <iframe src=javascript:alert(1)>   ",
        "<a href=\"https://evil.example\">premio</a>",
        "=HYPERLINK(\"https://evil.example\",\"<clic>\")",
    ]
}

fn contact_form() -> Value {
    json!({
        "nombre": "Ana María",
        "email": "ana@mail.com",
        "telefono": "3001234567",
        "tipoConsulta": "general",
        "mensaje": "Quisiera información sobre las visitas",
        "habeasData": true
    })
}

fn volunteer_envelope() -> Value {
    json!({
        "type": "voluntario",
        "data": {
            "nombre": "Luis Pérez",
            "email": "luis@parroquia.org",
            "telefono": "3109876543",
            "areaInteres": "visitas",
            "disponibilidad": "fines-de-semana",
            "motivacion": "Servir",
            "habeasData": true
        }
    })
}

/// Required contact fields, each paired with the message its absence produces.
pub const CONTACT_REQUIRED: [(&str, &str); 6] = [
    ("nombre", "El nombre es obligatorio"),
    ("email", "Por favor ingrese un correo electrónico válido"),
    ("telefono", "El teléfono es obligatorio"),
    ("tipoConsulta", "Por favor seleccione un tipo de consulta"),
    ("mensaje", "El mensaje es obligatorio"),
    ("habeasData", "Debe aceptar la política de tratamiento de datos"),
];

/// Required volunteer fields, in validation order.
pub const VOLUNTEER_REQUIRED: [&str; 7] = [
    "nombre",
    "email",
    "telefono",
    "areaInteres",
    "disponibilidad",
    "motivacion",
    "habeasData",
];

/// Bodies that are not a usable submission.
pub fn generate_malformed_bodies() -> Vec<&'static str> {
    vec![
        "",
        "null",
        "[]",
        "{",
        "nombre=Ana&email=ana@mail.com",
        r#"{"type":"voluntario"}"#,
        r#"{"data":{"nombre":"Ana"}}"#,
        r#"{"type":"voluntario","data":null}"#,
        r#"{"type":"","data":{}}"#,
        r#"{"type":"donacion","data":{"monto":"mucho"}}"#,
    ]
}

/// Body for request `index` of an attack.
pub fn generate_body(endpoint: Endpoint, payload: PayloadKind, index: usize) -> String {
    let mut value = match endpoint {
        Endpoint::Contact => contact_form(),
        Endpoint::Sheets => volunteer_envelope(),
    };
    let form = match endpoint {
        Endpoint::Contact => &mut value,
        Endpoint::Sheets => &mut value["data"],
    };

    match payload {
        PayloadKind::Valid => {}
        PayloadKind::Markup => {
            let markups = generate_markup_payloads();
            let markup = markups[index % markups.len()];
            form["nombre"] = json!(format!("{markup} Ana"));
            let text_field = match endpoint {
                Endpoint::Contact => "mensaje",
                Endpoint::Sheets => "motivacion",
            };
            form[text_field] = json!(markup);
        }
        PayloadKind::MissingField => {
            let field = match endpoint {
                Endpoint::Contact => CONTACT_REQUIRED[index % CONTACT_REQUIRED.len()].0,
                Endpoint::Sheets => VOLUNTEER_REQUIRED[index % VOLUNTEER_REQUIRED.len()],
            };
            if let Some(fields) = form.as_object_mut() {
                fields.remove(field);
            }
        }
        PayloadKind::Malformed => {
            let bodies = generate_malformed_bodies();
            return bodies[index % bodies.len()].to_string();
        }
    }

    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_forwarded_for_keeps_client_first() {
        let client: IpAddr = "10.0.0.9".parse().unwrap();
        for i in 0..10 {
            let header = forwarded_for(ForwardedFor::RotatingProxies, client, i);
            assert!(header.starts_with("10.0.0.9, 172.16."));
        }
        assert_ne!(
            forwarded_for(ForwardedFor::SpoofedFirstHop, client, 1),
            forwarded_for(ForwardedFor::SpoofedFirstHop, client, 2)
        );
    }

    #[test]
    fn test_missing_field_removes_one_field() {
        for i in 0..CONTACT_REQUIRED.len() {
            let body: Value =
                serde_json::from_str(&generate_body(Endpoint::Contact, PayloadKind::MissingField, i))
                    .unwrap();
            let fields = body.as_object().unwrap();
            assert_eq!(fields.len(), CONTACT_REQUIRED.len() - 1);
            assert!(!fields.contains_key(CONTACT_REQUIRED[i].0));
        }
    }
}
