use serde_json::json;

use crate::common::{FilePart, TestApp, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn course_without_image_is_created_with_null_media() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                &routes::admin("courses"),
                &json!({
                    "title": {"en": "Foundation Batch", "hi": "फाउंडेशन बैच"},
                    "price": 4999,
                    "features": ["Notes", "Mock tests"],
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["entity"], "courses");
        assert_eq!(res.body["slug"], "foundation-batch");
        assert_eq!(res.body["localized"]["title"]["en"], "Foundation Batch");
        assert_eq!(res.body["localized"]["title"]["hi"], "फाउंडेशन बैच");
        assert_eq!(res.body["localized"]["content"], json!({"en": "", "hi": ""}));
        assert_eq!(res.body["fields"]["courseMode"], "offline");
        assert_eq!(res.body["fields"]["features"], json!(["Notes", "Mock tests"]));
        assert!(res.body["media"].is_null());
        assert_eq!(res.body["active"], true);
        assert_eq!(res.body["schemaVersion"], 2);
    }

    #[tokio::test]
    async fn testimonial_multipart_upload_stores_the_photo() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                &routes::admin("testimonials"),
                &[
                    ("name", r#"{"en":"Asha","hi":"आशा"}"#),
                    ("quoteEn", "The mentors made the difference."),
                    ("rank", "12"),
                    ("imageAlt", "Asha smiling"),
                ],
                Some(FilePart::jpeg("photo.jpg")),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["localized"]["name"]["hi"], "आशा");
        assert_eq!(
            res.body["localized"]["quote"],
            json!({"en": "The mentors made the difference.", "hi": ""})
        );
        assert_eq!(res.body["fields"]["rank"], "12");

        let key = res.body["media"]["key"].as_str().unwrap();
        assert!(key.starts_with("testimonials/"), "key was {key}");
        assert!(key.ends_with("-photo.jpg"), "key was {key}");
        assert_eq!(res.body["media"]["url"], format!("/media/{key}"));
        assert_eq!(res.body["media"]["alt"], "Asha smiling");
        assert!(app.media_exists(key));
    }

    #[tokio::test]
    async fn testimonial_without_image_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                &routes::admin("testimonials"),
                &json!({"name": {"en": "Asha", "hi": ""}}),
            )
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_required_english_text_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                &routes::admin("announcements"),
                &json!({"title": {"en": "  ", "hi": "सूचना"}}),
            )
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let app = TestApp::spawn().await;

        let pdf = FilePart {
            file_name: "brochure.pdf",
            mime: "application/pdf",
            bytes: b"%PDF-1.4".to_vec(),
        };
        let res = app
            .post_form(
                &routes::admin("gallery"),
                &[("titleEn", "Campus")],
                Some(pdf),
            )
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn image_for_an_entity_without_media_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                &routes::admin("announcements"),
                &[("titleEn", "Admissions open")],
                Some(FilePart::jpeg("banner.jpg")),
            )
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn slider_type_must_be_desktop_or_mobile() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                &routes::admin("sliders"),
                &[("type", "Tablet")],
                Some(FilePart::jpeg("banner.jpg")),
            )
            .await;
        res.assert_error(400, "VALIDATION_ERROR");

        let res = app
            .post_form(
                &routes::admin("sliders"),
                &[("type", "Mobile")],
                Some(FilePart::jpeg("banner.jpg")),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["fields"]["type"], "Mobile");
    }

    #[tokio::test]
    async fn result_carries_its_call_to_action() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                &routes::admin("results"),
                &[
                    ("nameEn", "Priya Sharma"),
                    ("year", "2024"),
                    ("btnName", "Read her story"),
                    ("btnLink", "/toppers/priya"),
                ],
                Some(FilePart::jpeg("priya.jpg")),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["fields"]["btnName"], "Read her story");
        assert_eq!(res.body["fields"]["btnLink"], "/toppers/priya");
    }

    #[tokio::test]
    async fn announcement_gets_the_default_background() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                &routes::admin("announcements"),
                &json!({"title": {"en": "Admissions open", "hi": ""}, "link": "/ignored"}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["fields"], json!({"bgcolor": "bg-blue-500"}));
    }

    #[tokio::test]
    async fn repeated_localized_form_key_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                &routes::admin("announcements"),
                &[("title", "First"), ("title", "Second")],
                None,
            )
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let app = TestApp::spawn().await;
        let body = json!({"title": {"en": "Prelims Crash Course", "hi": ""}});

        let first = app.post(&routes::admin("courses"), &body).await;
        assert_eq!(first.status, 201, "{}", first.text);

        let res = app.post(&routes::admin("courses"), &body).await;
        res.assert_error(409, "CONFLICT");
    }

    #[tokio::test]
    async fn unknown_entity_type_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post(&routes::admin("podcasts"), &json!({"title": "x"}))
            .await;

        res.assert_error(404, "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_json_uses_the_error_envelope() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::admin("courses")))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .expect("Failed to send POST request");
        let res = crate::common::TestResponse::from_response(res).await;

        res.assert_error(400, "VALIDATION_ERROR");
    }
}

mod elearnings {
    use super::*;

    #[tokio::test]
    async fn both_language_pdfs_are_stored_in_their_folders() {
        let app = TestApp::spawn().await;

        let res = app
            .post_files(
                &routes::admin("elearnings"),
                &[
                    ("titleEN", "Polity Monthly"),
                    ("titleHI", "राजव्यवस्था मासिक"),
                    ("monthYear", "June 2024"),
                    ("displayOrder", "1"),
                ],
                vec![
                    ("fileEN", FilePart::pdf("polity-en.pdf")),
                    ("fileHI", FilePart::pdf("polity-hi.pdf")),
                ],
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["entity"], "elearnings");
        assert!(res.body["media"].is_null());
        assert_eq!(res.body["fields"]["monthYear"], "June 2024");
        assert_eq!(res.body["localized"]["title"]["hi"], "राजव्यवस्था मासिक");
        let en = res.body["files"]["fileEN"]["key"].as_str().unwrap();
        let hi = res.body["files"]["fileHI"]["key"].as_str().unwrap();
        assert!(en.starts_with("elearning/en/"), "key was {en}");
        assert!(hi.starts_with("elearning/hi/"), "key was {hi}");
        assert!(app.media_exists(en));
        assert!(app.media_exists(hi));
    }

    #[tokio::test]
    async fn english_pdf_is_required_and_must_be_a_pdf() {
        let app = TestApp::spawn().await;
        let fields = [("titleEN", "Polity"), ("titleHI", "राजव्यवस्था"), ("monthYear", "May 2024")];

        let missing = app
            .post_files(
                &routes::admin("elearnings"),
                &fields,
                vec![("fileHI", FilePart::pdf("polity-hi.pdf"))],
            )
            .await;
        missing.assert_error(400, "VALIDATION_ERROR");

        let image = app
            .post_files(
                &routes::admin("elearnings"),
                &fields,
                vec![("fileEN", FilePart::jpeg("polity.jpg"))],
            )
            .await;
        image.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn replacing_the_hindi_pdf_keeps_the_english_one() {
        let app = TestApp::spawn().await;
        let created = app
            .post_files(
                &routes::admin("elearnings"),
                &[("titleEN", "Economy"), ("titleHI", "अर्थव्यवस्था"), ("monthYear", "July 2024")],
                vec![
                    ("fileEN", FilePart::pdf("economy-en.pdf")),
                    ("fileHI", FilePart::pdf("economy-hi.pdf")),
                ],
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let id = created.id();
        let en = created.body["files"]["fileEN"]["key"].as_str().unwrap().to_string();
        let old_hi = created.body["files"]["fileHI"]["key"].as_str().unwrap().to_string();

        let res = app
            .put_files(
                &routes::admin_record("elearnings", &id),
                &[],
                vec![("fileHI", FilePart::pdf("economy-hi-v2.pdf"))],
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["files"]["fileEN"]["key"], en.as_str());
        let new_hi = res.body["files"]["fileHI"]["key"].as_str().unwrap();
        assert!(new_hi.ends_with("-economy-hi-v2.pdf"), "key was {new_hi}");
        assert!(!app.media_exists(&old_hi));
        assert!(app.media_exists(new_hi));

        let removed = app.delete(&routes::admin_record("elearnings", &id)).await;
        assert_eq!(removed.status, 204, "{}", removed.text);
        assert!(!app.media_exists(&en));
        assert!(!app.media_exists(new_hi));
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn record_can_be_fetched_by_id_or_slug() {
        let app = TestApp::spawn().await;
        let created = app
            .post(
                &routes::admin("courses"),
                &json!({"title": {"en": "Mains Answer Writing", "hi": ""}}),
            )
            .await;
        let id = created.id();

        let by_id = app.get(&routes::admin_record("courses", &id)).await;
        assert_eq!(by_id.status, 200, "{}", by_id.text);
        assert_eq!(by_id.body["id"], id.as_str());

        let by_slug = app
            .get(&routes::admin_record("courses", "mains-answer-writing"))
            .await;
        assert_eq!(by_slug.status, 200, "{}", by_slug.text);
        assert_eq!(by_slug.body["id"], id.as_str());
    }

    #[tokio::test]
    async fn records_are_scoped_to_their_entity_type() {
        let app = TestApp::spawn().await;
        let id = app.create_testimonial("Asha").await;

        let res = app.get(&routes::admin_record("results", &id)).await;

        res.assert_error(404, "NOT_FOUND");
    }

    #[tokio::test]
    async fn admin_list_includes_inactive_records() {
        let app = TestApp::spawn().await;
        app.post(
            &routes::admin("announcements"),
            &json!({"title": {"en": "Live", "hi": ""}}),
        )
        .await;
        app.post(
            &routes::admin("announcements"),
            &json!({"title": {"en": "Draft", "hi": ""}, "active": false}),
        )
        .await;

        let all = app.get(&routes::admin("announcements")).await;
        assert_eq!(all.status, 200, "{}", all.text);
        assert_eq!(all.body["pagination"]["total"], 2);

        let inactive = app
            .get(&format!("{}?active=false", routes::admin("announcements")))
            .await;
        assert_eq!(inactive.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(inactive.body["data"][0]["localized"]["title"]["en"], "Draft");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn partial_update_keeps_omitted_locales_and_fields() {
        let app = TestApp::spawn().await;
        let created = app
            .post(
                &routes::admin("courses"),
                &json!({
                    "title": {"en": "Foundation Batch", "hi": "फाउंडेशन बैच"},
                    "duration": "12 months",
                }),
            )
            .await;
        let id = created.id();

        let res = app
            .put(
                &routes::admin_record("courses", &id),
                &json!({"title": {"en": "Foundation Batch 2025"}}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body["localized"]["title"],
            json!({"en": "Foundation Batch 2025", "hi": "फाउंडेशन बैच"})
        );
        assert_eq!(res.body["fields"]["duration"], "12 months");
        assert_eq!(res.body["slug"], "foundation-batch");
    }

    #[tokio::test]
    async fn new_image_replaces_and_removes_the_old_object() {
        let app = TestApp::spawn().await;
        let id = app.create_testimonial("Asha").await;
        let before = app.get(&routes::admin_record("testimonials", &id)).await;
        let old_key = before.body["media"]["key"].as_str().unwrap().to_string();

        let res = app
            .put_form(
                &routes::admin_record("testimonials", &id),
                &[],
                Some(FilePart::jpeg("new-portrait.jpg")),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let new_key = res.body["media"]["key"].as_str().unwrap();
        assert!(new_key.ends_with("-new-portrait.jpg"), "key was {new_key}");
        assert!(app.media_exists(new_key));
        assert!(!app.media_exists(&old_key));
        assert_eq!(res.body["localized"]["name"]["en"], "Asha");
    }

    #[tokio::test]
    async fn updating_a_missing_record_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .put(
                &routes::admin_record("courses", "does-not-exist"),
                &json!({"title": {"en": "x"}}),
            )
            .await;

        res.assert_error(404, "NOT_FOUND");
    }
}

mod status_and_delete {
    use super::*;

    #[tokio::test]
    async fn deactivated_testimonial_is_hidden_publicly_but_visible_to_admin() {
        let app = TestApp::spawn().await;
        let id = app.create_testimonial("Asha").await;

        let res = app
            .patch(
                &routes::admin_record("testimonials", &id),
                &json!({"active": false}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["active"], false);

        let public = app.get(&routes::public("testimonials")).await;
        assert_eq!(public.status, 200, "{}", public.text);
        assert_eq!(public.body["data"], json!([]));
        assert_eq!(public.body["pagination"]["total"], 0);

        let admin = app.get(&routes::admin_record("testimonials", &id)).await;
        assert_eq!(admin.status, 200, "{}", admin.text);
        assert_eq!(admin.body["active"], false);
    }

    #[tokio::test]
    async fn status_toggle_requires_a_boolean() {
        let app = TestApp::spawn().await;
        let id = app.create_testimonial("Asha").await;

        let res = app
            .patch(
                &routes::admin_record("testimonials", &id),
                &json!({"active": "nope"}),
            )
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn delete_removes_record_and_media() {
        let app = TestApp::spawn().await;
        let id = app.create_testimonial("Asha").await;
        let created = app.get(&routes::admin_record("testimonials", &id)).await;
        let key = created.body["media"]["key"].as_str().unwrap().to_string();
        assert!(app.media_exists(&key));

        let res = app.delete(&routes::admin_record("testimonials", &id)).await;
        assert_eq!(res.status, 204, "{}", res.text);
        assert!(!app.media_exists(&key));

        let gone = app.get(&routes::admin_record("testimonials", &id)).await;
        gone.assert_error(404, "NOT_FOUND");

        let again = app.delete(&routes::admin_record("testimonials", &id)).await;
        again.assert_error(404, "NOT_FOUND");
    }
}
