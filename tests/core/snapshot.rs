//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use pagesnap::core::{create_snapshot, SnapshotOptions};
    use pagesnap::relocator::{FetchError, PersistError, SkipReason};
    use pagesnap::utils::url::Url;

    const BASE: &str = "https://example.com/dir/page.html";

    fn fetch_ok(url: &Url) -> Result<Vec<u8>, FetchError> {
        Ok(format!("/* {} */", url.path()).into_bytes())
    }

    #[test]
    fn partial_failure_rewrites_only_saved_stylesheet() {
        let saved = Mutex::new(BTreeMap::new());
        let fetch = |url: &Url| -> Result<Vec<u8>, FetchError> {
            if url.path().ends_with("missing.css") {
                Err(FetchError::new("HTTP error: 404 Not Found"))
            } else {
                fetch_ok(url)
            }
        };
        let persist = |name: &str, data: &[u8]| -> Result<(), PersistError> {
            saved.lock().unwrap().insert(name.to_string(), data.to_vec());
            Ok(())
        };
        let page = "<html><head>\
                    <link rel=\"stylesheet\" href=\"css/styles.css\">\
                    <link rel=\"stylesheet\" href=\"/missing.css\">\
                    </head><body></body></html>";

        let snapshot = create_snapshot(
            page.as_bytes(),
            BASE,
            &SnapshotOptions::default(),
            &fetch,
            &persist,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(snapshot.html).unwrap(),
            "<html><head>\
             <link rel=\"stylesheet\" href=\"styles.css\">\
             <link rel=\"stylesheet\" href=\"/missing.css\">\
             </head><body></body></html>\n"
        );
        assert_eq!(snapshot.mapping.get("css/styles.css"), Some("styles.css"));
        assert_eq!(snapshot.skipped.len(), 1);
        assert_eq!(snapshot.skipped[0].href, "/missing.css");
        assert!(matches!(
            &snapshot.skipped[0].reason,
            SkipReason::Fetch { url, .. } if url == "https://example.com/missing.css"
        ));
        assert_eq!(
            saved.lock().unwrap().get("styles.css").map(Vec::as_slice),
            Some(b"/* /dir/css/styles.css */".as_slice())
        );
    }

    #[test]
    fn base_element_no_longer_redirects_local_copies() {
        let requested = Mutex::new(Vec::new());
        let fetch = |url: &Url| -> Result<Vec<u8>, FetchError> {
            requested.lock().unwrap().push(url.to_string());
            fetch_ok(url)
        };
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };
        let page = "<html><head>\
                    <base href=\"https://cdn.example.com/assets/\">\
                    <link rel=\"stylesheet\" href=\"theme/a.css\">\
                    </head><body></body></html>";

        let snapshot = create_snapshot(
            page.as_bytes(),
            BASE,
            &SnapshotOptions::default(),
            &fetch,
            &persist,
        )
        .unwrap();

        assert_eq!(
            *requested.lock().unwrap(),
            vec!["https://cdn.example.com/assets/theme/a.css".to_string()]
        );
        assert_eq!(
            String::from_utf8(snapshot.html).unwrap(),
            "<html><head><base><link rel=\"stylesheet\" href=\"a.css\">\
             </head><body></body></html>\n"
        );
    }

    #[test]
    fn links_are_rewritten_to_local_names() {
        let page = "<head>\
                    <link rel=\"stylesheet\" href=\"https://cdn.example.com/lib/site.css?v=3\">\
                    <link rel=\"icon\" href=\"favicon.ico\">\
                    </head>";
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };

        let snapshot = create_snapshot(
            page.as_bytes(),
            BASE,
            &SnapshotOptions::default(),
            &fetch_ok,
            &persist,
        )
        .unwrap();

        let html = String::from_utf8(snapshot.html).unwrap();
        assert!(html.contains("<link rel=\"stylesheet\" href=\"site.css\">"));
        assert!(html.contains("<link rel=\"icon\" href=\"favicon.ico\">"));
        assert!(snapshot.skipped.is_empty());
    }

    #[test]
    fn colliding_names_get_suffixes_in_document_order() {
        let page = "<head>\
                    <link rel=\"stylesheet\" href=\"a/main.css\">\
                    <link rel=\"stylesheet\" href=\"b/main.css\">\
                    <link rel=\"stylesheet\" href=\"c/main.css\">\
                    </head>";
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };
        let options = SnapshotOptions {
            jobs: 3,
            ..SnapshotOptions::default()
        };

        let snapshot =
            create_snapshot(page.as_bytes(), BASE, &options, &fetch_ok, &persist).unwrap();

        let mapping: Vec<(&str, &str)> = snapshot.mapping.iter().collect();
        assert_eq!(
            mapping,
            vec![
                ("a/main.css", "main.css"),
                ("b/main.css", "main-1.css"),
                ("c/main.css", "main-2.css"),
            ]
        );
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let page: String = (0..12)
            .map(|i| format!("<link rel=\"stylesheet\" href=\"css/{}/style.css\">", i % 5))
            .collect();
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };

        let sequential = create_snapshot(
            page.as_bytes(),
            BASE,
            &SnapshotOptions {
                jobs: 1,
                ..SnapshotOptions::default()
            },
            &fetch_ok,
            &persist,
        )
        .unwrap();
        let parallel = create_snapshot(
            page.as_bytes(),
            BASE,
            &SnapshotOptions {
                jobs: 8,
                ..SnapshotOptions::default()
            },
            &fetch_ok,
            &persist,
        )
        .unwrap();

        assert_eq!(sequential.html, parallel.html);
        assert_eq!(sequential.mapping, parallel.mapping);
        assert_eq!(parallel.mapping.len(), 5);
    }

    #[test]
    fn duplicate_links_are_fetched_once() {
        let fetched = Mutex::new(0);
        let fetch = |url: &Url| -> Result<Vec<u8>, FetchError> {
            *fetched.lock().unwrap() += 1;
            fetch_ok(url)
        };
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };
        let page = "<link rel=\"stylesheet\" href=\"x.css\">\
                    <p>between</p>\
                    <link rel=\"stylesheet\" href=\"x.css\">";

        let snapshot = create_snapshot(
            page.as_bytes(),
            BASE,
            &SnapshotOptions::default(),
            &fetch,
            &persist,
        )
        .unwrap();

        assert_eq!(*fetched.lock().unwrap(), 1);
        let html = String::from_utf8(snapshot.html).unwrap();
        assert_eq!(html.matches("href=\"x.css\"").count(), 2);
    }

    #[test]
    fn scripts_are_removed_everywhere() {
        let page = "<html><head><script src=\"a.js\"></script></head>\
                    <body><div><script>1</script><p>kept</p></div>\
                    <script>2</script></body></html>";
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };

        let snapshot = create_snapshot(
            page.as_bytes(),
            BASE,
            &SnapshotOptions::default(),
            &fetch_ok,
            &persist,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(snapshot.html).unwrap(),
            "<html><head></head><body><div><p>kept</p></div></body></html>\n"
        );
    }

    #[test]
    fn page_without_stylesheets_is_unchanged() {
        let page = "<!DOCTYPE html><html><head><title>t</title></head><body><p>x</p></body></html>";
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };

        let snapshot = create_snapshot(
            page.as_bytes(),
            BASE,
            &SnapshotOptions::default(),
            &fetch_ok,
            &persist,
        )
        .unwrap();

        assert_eq!(String::from_utf8(snapshot.html).unwrap(), format!("{page}\n"));
        assert!(snapshot.mapping.is_empty());
        assert!(snapshot.skipped.is_empty());
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use pagesnap::core::{create_snapshot, SnapshotError, SnapshotOptions};
    use pagesnap::relocator::{FetchError, PersistError, SkipReason};
    use pagesnap::utils::url::Url;

    fn fetch_ok(_: &Url) -> Result<Vec<u8>, FetchError> {
        Ok(b"p {}".to_vec())
    }

    #[test]
    fn empty_page() {
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };
        let result = create_snapshot(
            b"",
            "https://example.com/",
            &SnapshotOptions::default(),
            &fetch_ok,
            &persist,
        );

        assert!(matches!(result, Err(SnapshotError::EmptyDocument)));
    }

    #[test]
    fn persist_failure_is_reported_not_fatal() {
        let persist = |name: &str, _: &[u8]| -> Result<(), PersistError> {
            Err(PersistError::new(format!("disk full while writing {name}")))
        };
        let page = b"<link rel=\"stylesheet\" href=\"a.css\">";

        let snapshot = create_snapshot(
            page,
            "https://example.com/",
            &SnapshotOptions::default(),
            &fetch_ok,
            &persist,
        )
        .unwrap();

        assert!(snapshot.mapping.is_empty());
        assert_eq!(snapshot.skipped.len(), 1);
        assert!(matches!(
            &snapshot.skipped[0].reason,
            SkipReason::Persist { name, .. } if name == "a.css"
        ));
        assert!(String::from_utf8(snapshot.html)
            .unwrap()
            .contains("href=\"a.css\""));
    }

    #[test]
    fn every_fetch_failing() {
        let fetch = |_: &Url| -> Result<Vec<u8>, FetchError> { Err(FetchError::new("offline")) };
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };
        let page = b"<link rel=\"stylesheet\" href=\"a.css\">\
                     <link rel=\"stylesheet\" href=\"b.css\">";

        let snapshot = create_snapshot(
            page,
            "https://example.com/",
            &SnapshotOptions::default(),
            &fetch,
            &persist,
        )
        .unwrap();

        let skipped: Vec<&str> = snapshot.skipped.iter().map(|s| s.href.as_str()).collect();
        assert_eq!(skipped, vec!["a.css", "b.css"]);
        assert!(snapshot.mapping.is_empty());
    }

    #[test]
    fn relative_link_without_base() {
        let persist = |_: &str, _: &[u8]| -> Result<(), PersistError> { Ok(()) };
        let snapshot = create_snapshot(
            b"<link rel=\"stylesheet\" href=\"a.css\">",
            "",
            &SnapshotOptions::default(),
            &fetch_ok,
            &persist,
        )
        .unwrap();

        assert_eq!(snapshot.skipped.len(), 1);
        assert!(matches!(snapshot.skipped[0].reason, SkipReason::Resolution(_)));
    }
}
