use indexmap::IndexSet;

use reqwire_domain::{ReqwireError, Result, Specifier};

use crate::index::{scan_package_releases, urls_or_default};

/// External best-match capability: pick one concrete release for a loose
/// specifier, honoring the prerelease policy and the given index set.
pub trait BestMatch {
    fn find_best_match(
        &self,
        specifier: &Specifier,
        prereleases: bool,
        index_urls: &IndexSet<String>,
    ) -> Result<Specifier>;
}

/// External full-graph resolution capability, supplied at the orchestration
/// boundary. The core consumes its output and never depends on how it
/// resolves.
pub trait ResolveAll {
    fn resolve_all(
        &self,
        constraints: &IndexSet<Specifier>,
        prereleases: bool,
    ) -> Result<IndexSet<Specifier>>;
}

/// Resolve one raw specifier line.
///
/// Specifiers already pinned to an exact version and editable installs are
/// returned unchanged without a network round trip, as is everything when
/// `resolve_versions` is off. Otherwise the best-match capability picks the
/// release; the returned pin keeps the package name exactly as typed, since
/// canonical-name rewriting is a separate step.
pub fn resolve_specifier(
    line: &str,
    prereleases: bool,
    resolve_versions: bool,
    index_urls: &IndexSet<String>,
    best_match: &dyn BestMatch,
) -> Result<Specifier> {
    let specifier = Specifier::parse(line)?;
    if specifier.is_editable() || specifier.is_pinned() || !resolve_versions {
        return Ok(specifier);
    }
    let matched = best_match.find_best_match(&specifier, prereleases, index_urls)?;
    match specifier.name() {
        Some(name) => matched.with_name(&name),
        None => Ok(matched),
    }
}

/// Best-match against the release listings of the configured package
/// indexes: the newest published version satisfying the constraint wins,
/// with prereleases excluded unless requested. Indexes are consulted in
/// order; the first index with any satisfying release decides.
#[derive(Clone, Copy, Debug, Default)]
pub struct PackageIndexResolver;

impl BestMatch for PackageIndexResolver {
    fn find_best_match(
        &self,
        specifier: &Specifier,
        prereleases: bool,
        index_urls: &IndexSet<String>,
    ) -> Result<Specifier> {
        let Some(name) = specifier.name() else {
            return Err(no_candidate(specifier));
        };
        for index_url in urls_or_default(index_urls) {
            let mut releases = scan_package_releases(index_url, &name)?;
            if !prereleases {
                releases.retain(|version| !version.any_prerelease());
            }
            if let Some(constraint) = specifier.version_specifiers() {
                releases.retain(|version| constraint.contains(version));
            }
            if let Some(best) = releases.into_iter().max() {
                return specifier.pinned_to(&best);
            }
        }
        Err(no_candidate(specifier))
    }
}

fn no_candidate(specifier: &Specifier) -> ReqwireError {
    ReqwireError::NoCandidateFound {
        specifier: specifier.render().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    struct StubBestMatch(&'static str);

    impl BestMatch for StubBestMatch {
        fn find_best_match(
            &self,
            _specifier: &Specifier,
            _prereleases: bool,
            _index_urls: &IndexSet<String>,
        ) -> Result<Specifier> {
            Specifier::parse(self.0)
        }
    }

    fn project_page(server: &Server, path: &str, body: &'static str) {
        server.expect(
            Expectation::matching(request::method_path("GET", path.to_string()))
                .times(..)
                .respond_with(status_code(200).body(body)),
        );
    }

    #[test]
    fn pinned_specifiers_skip_resolution() {
        struct Panicking;
        impl BestMatch for Panicking {
            fn find_best_match(
                &self,
                specifier: &Specifier,
                _prereleases: bool,
                _index_urls: &IndexSet<String>,
            ) -> Result<Specifier> {
                panic!("resolver must not be consulted for {specifier}");
            }
        }
        let resolved =
            resolve_specifier("flask==0.11.1", false, true, &IndexSet::new(), &Panicking)
                .expect("resolve");
        assert_eq!(resolved.render(), "flask==0.11.1");

        let editable =
            resolve_specifier("-e ./pkg/local", false, true, &IndexSet::new(), &Panicking)
                .expect("resolve");
        assert_eq!(editable.render(), "-e ./pkg/local");

        let unresolved = resolve_specifier("flask", false, false, &IndexSet::new(), &Panicking)
            .expect("resolve");
        assert_eq!(unresolved.render(), "flask");
    }

    #[test]
    fn resolved_pin_keeps_the_name_as_typed() {
        let resolved = resolve_specifier(
            "flask",
            false,
            true,
            &IndexSet::new(),
            &StubBestMatch("Flask==0.11.1"),
        )
        .expect("resolve");
        assert_eq!(resolved.render(), "flask==0.11.1");
    }

    #[test]
    fn index_resolver_picks_the_newest_satisfying_release() {
        let server = Server::run();
        project_page(
            &server,
            "/simple/flask/",
            "<a>Flask-0.10.1.tar.gz</a><a>Flask-0.11.1.tar.gz</a>\
             <a>Flask-1.0a1.tar.gz</a>",
        );
        let index_urls: IndexSet<String> = [server.url_str("/simple/")].into_iter().collect();
        let specifier = Specifier::parse("flask").expect("parse");

        let pinned = PackageIndexResolver
            .find_best_match(&specifier, false, &index_urls)
            .expect("resolve");
        assert_eq!(pinned.render(), "flask==0.11.1");

        let pre = PackageIndexResolver
            .find_best_match(&specifier, true, &index_urls)
            .expect("resolve");
        assert_eq!(pre.render(), "flask==1.0a1");
    }

    #[test]
    fn index_resolver_honors_version_constraints() {
        let server = Server::run();
        project_page(
            &server,
            "/simple/flask/",
            "<a>Flask-0.10.1.tar.gz</a><a>Flask-0.11.1.tar.gz</a>",
        );
        let index_urls: IndexSet<String> = [server.url_str("/simple/")].into_iter().collect();

        let constrained = Specifier::parse("flask<0.11").expect("parse");
        let pinned = PackageIndexResolver
            .find_best_match(&constrained, false, &index_urls)
            .expect("resolve");
        assert_eq!(pinned.render(), "flask==0.10.1");
    }

    #[test]
    fn no_satisfying_release_is_an_error() {
        let server = Server::run();
        project_page(&server, "/simple/flask/", "<a>Flask-0.10.1.tar.gz</a>");
        let index_urls: IndexSet<String> = [server.url_str("/simple/")].into_iter().collect();

        let impossible = Specifier::parse("flask>=99").expect("parse");
        let err = PackageIndexResolver
            .find_best_match(&impossible, false, &index_urls)
            .expect_err("must fail");
        assert!(matches!(err, ReqwireError::NoCandidateFound { .. }));
    }
}
