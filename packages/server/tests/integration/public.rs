use serde_json::json;

use crate::common::{TestApp, routes};

mod listing {
    use super::*;

    #[tokio::test]
    async fn active_records_are_ordered_by_display_order() {
        let app = TestApp::spawn().await;
        for (title, order) in [("Second", 2), ("First", 1)] {
            let res = app
                .post(
                    &routes::admin("announcements"),
                    &json!({"title": {"en": title, "hi": ""}, "displayOrder": order}),
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }
        app.post(
            &routes::admin("announcements"),
            &json!({"title": {"en": "Hidden", "hi": ""}, "active": false, "displayOrder": 0}),
        )
        .await;

        let res = app.get(&routes::public("announcements")).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let titles: Vec<&str> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["localized"]["title"]["en"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["First", "Second"]);
        assert_eq!(res.body["pagination"]["total"], 2);
        assert_eq!(res.body["pagination"]["per_page"], 20);
    }

    #[tokio::test]
    async fn pages_past_the_end_are_empty() {
        let app = TestApp::spawn().await;
        for n in 0..3 {
            app.post(
                &routes::admin("announcements"),
                &json!({"title": {"en": format!("Notice {n}"), "hi": ""}}),
            )
            .await;
        }

        let first = app
            .get(&format!("{}?per_page=2&page=1", routes::public("announcements")))
            .await;
        assert_eq!(first.body["data"].as_array().unwrap().len(), 2);
        assert_eq!(first.body["pagination"]["total_pages"], 2);

        let beyond = app
            .get(&format!("{}?per_page=2&page=9", routes::public("announcements")))
            .await;
        assert_eq!(beyond.status, 200, "{}", beyond.text);
        assert_eq!(beyond.body["data"], json!([]));
        assert_eq!(beyond.body["pagination"]["total"], 3);
    }

    #[tokio::test]
    async fn category_filter_accepts_a_slug() {
        let app = TestApp::spawn().await;
        let economy = app.create_category("Economy").await;
        let polity = app.create_category("Polity").await;
        for (slug, category) in [("gdp-data", &economy), ("new-bill", &polity)] {
            let res = app
                .post(
                    &routes::admin("current-affairs"),
                    &json!({"title": {"en": slug, "hi": ""}, "slug": slug, "category": category}),
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let res = app
            .get(&format!("{}?category=economy", routes::public("current-affairs")))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["slug"], "gdp-data");
        assert_eq!(data[0]["category"]["name"], "Economy");

        let unknown = app
            .get(&format!("{}?category=history", routes::public("current-affairs")))
            .await;
        assert_eq!(unknown.status, 200, "{}", unknown.text);
        assert_eq!(unknown.body["data"], json!([]));
    }

    #[tokio::test]
    async fn unknown_entity_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::public("podcasts")).await;

        res.assert_error(404, "NOT_FOUND");
    }
}

mod detail {
    use super::*;

    #[tokio::test]
    async fn active_record_is_served_by_slug() {
        let app = TestApp::spawn().await;
        app.post(
            &routes::admin("courses"),
            &json!({"title": {"en": "Optional Sociology", "hi": "वैकल्पिक समाजशास्त्र"}}),
        )
        .await;

        let res = app
            .get(&routes::public_record("courses", "optional-sociology"))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["localized"]["title"]["hi"], "वैकल्पिक समाजशास्त्र");
    }

    #[tokio::test]
    async fn inactive_record_is_not_found() {
        let app = TestApp::spawn().await;
        let id = app.create_testimonial("Asha").await;
        app.patch(
            &routes::admin_record("testimonials", &id),
            &json!({"active": false}),
        )
        .await;

        let res = app.get(&routes::public_record("testimonials", &id)).await;

        res.assert_error(404, "NOT_FOUND");
    }
}

mod scholarships {
    use super::*;

    #[tokio::test]
    async fn application_is_accepted_and_kept_private() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                &routes::public("scholarships"),
                &json!({
                    "name": "Ravi Kumar",
                    "phone": "9876543210",
                    "email": "ravi@example.com",
                    "course": "Foundation Batch",
                    "active": false,
                    "displayOrder": 1,
                }),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["entity"], "scholarships");
        assert_eq!(res.body["fields"]["name"], "Ravi Kumar");
        assert_eq!(res.body["active"], true);

        let public = app.get(&routes::public("scholarships")).await;
        public.assert_error(404, "NOT_FOUND");

        let admin = app.get(&routes::admin("scholarships")).await;
        assert_eq!(admin.status, 200, "{}", admin.text);
        assert_eq!(admin.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn application_requires_contact_details() {
        let app = TestApp::spawn().await;

        let res = app
            .post(&routes::public("scholarships"), &json!({"name": "Ravi"}))
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn other_entities_do_not_accept_public_submissions() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                &routes::public("announcements"),
                &json!({"title": {"en": "Spam", "hi": ""}}),
            )
            .await;

        res.assert_error(404, "NOT_FOUND");
    }
}

mod contact {
    use super::*;

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::CONTACT, &json!({"firstName": "Ravi", "message": "Hello"}))
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn message_is_accepted_without_a_mail_relay() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::CONTACT,
                &json!({
                    "firstName": "Ravi",
                    "email": "ravi@example.com",
                    "phone": "9876543210",
                    "message": "When does the next batch start?",
                }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["message"].is_string());
    }
}
