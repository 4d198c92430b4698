//! Identifiers and module specifiers the migration recognizes or emits.

pub(crate) const GET_DATA: &str = "getData";
pub(crate) const GENERATE_STATIC_PARAMS: &str = "generateStaticParams";
pub(crate) const PAGE_PROPS: &str = "PageProps";

pub(crate) const NEXT: &str = "next";
pub(crate) const NEXT_NAVIGATION: &str = "next/navigation";
pub(crate) const NEXT_HEADERS: &str = "next/headers";

/// One of the legacy pages-router data fetching exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataFunction {
    GetStaticPaths,
    GetStaticProps,
    GetServerSideProps,
}

impl DataFunction {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "getStaticPaths" => Some(Self::GetStaticPaths),
            "getStaticProps" => Some(Self::GetStaticProps),
            "getServerSideProps" => Some(Self::GetServerSideProps),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::GetStaticPaths => "getStaticPaths",
            Self::GetStaticProps => "getStaticProps",
            Self::GetServerSideProps => "getServerSideProps",
        }
    }

    /// Type of the `ctx` argument the framework passes in.
    pub(crate) fn context_type_name(self) -> &'static str {
        match self {
            Self::GetServerSideProps => "GetServerSidePropsContext",
            _ => "GetStaticPropsContext",
        }
    }
}
